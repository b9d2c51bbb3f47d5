//! Backend domain: simulated transport between the client and the authority.

use bevy::prelude::*;
use chrono::{DateTime, Duration, Utc};

use super::{BackendRequest, BackendResponse, RequestError, RequestId, SessionBackend, dispatch};

/// A reply delivered back to the client, tagged with the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: RequestId,
    pub request: BackendRequest,
    pub result: Result<BackendResponse, RequestError>,
}

#[derive(Debug)]
struct InFlight {
    id: RequestId,
    request: BackendRequest,
    due_at: DateTime<Utc>,
    seq: u64,
}

/// Queue of requests waiting out their latency.
///
/// Each request is executed when it arrives at the authority, and replies come
/// back in arrival order, which is not necessarily submission order.
#[derive(Resource, Debug)]
pub struct BackendLink {
    latency: Duration,
    queue: Vec<InFlight>,
    next_seq: u64,
}

impl BackendLink {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::milliseconds(i64::try_from(latency_ms).unwrap_or(i64::MAX)),
            queue: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn submit(&mut self, id: RequestId, request: BackendRequest, now: DateTime<Utc>) {
        let latency = self.latency;
        self.submit_with_latency(id, request, now, latency);
    }

    pub fn submit_with_latency(
        &mut self,
        id: RequestId,
        request: BackendRequest,
        now: DateTime<Utc>,
        latency: Duration,
    ) {
        debug!("-> {} {}", request.label(), id);
        self.next_seq += 1;
        self.queue.push(InFlight {
            id,
            request,
            due_at: now + latency,
            seq: self.next_seq,
        });
    }

    /// Executes every request due by `now` and returns the replies in arrival order.
    pub fn poll(&mut self, backend: &mut dyn SessionBackend, now: DateTime<Utc>) -> Vec<Reply> {
        let (mut due, waiting): (Vec<InFlight>, Vec<InFlight>) =
            self.queue.drain(..).partition(|r| r.due_at <= now);
        self.queue = waiting;
        due.sort_by_key(|r| (r.due_at, r.seq));

        due.into_iter()
            .map(|r| {
                let result = dispatch(backend, &r.request, r.due_at);
                if let Err(err) = &result {
                    debug!("<- {} {} failed: {}", r.request.label(), r.id, err);
                }
                Reply {
                    id: r.id,
                    request: r.request,
                    result,
                }
            })
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
