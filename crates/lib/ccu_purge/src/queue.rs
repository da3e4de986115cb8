use crate::{
    error::{Error, Result},
    options::ApiVersion,
    target::Target,
};
use std::collections::{VecDeque, vec_deque};

/// Upper bound for a single purge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchLimit {
    /// at most this many targets
    Count(usize),
    /// at most this many bytes of JSON-encoded targets
    Bytes(usize),
}

impl BatchLimit {
    // CCUAPI documents "about" 100 urls per request, v2 accepts 200 objects,
    // v3 caps the request body at 50,000 bytes, we leave room for the envelope.
    pub const CCUAPI_MAX_TARGETS: usize = 100;
    pub const V2_MAX_TARGETS: usize = 200;
    pub const V3_MAX_BYTES: usize = 45_000;

    pub fn default_for(api: ApiVersion) -> Self {
        match api {
            ApiVersion::Ccuapi => Self::Count(Self::CCUAPI_MAX_TARGETS),
            ApiVersion::V2 => Self::Count(Self::V2_MAX_TARGETS),
            ApiVersion::V3 => Self::Bytes(Self::V3_MAX_BYTES),
        }
    }
}

/// Targets waiting to be purged, in insertion order.
///
/// Not deduplicated: adding the same url twice purges it twice.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    targets: VecDeque<Target>,
}

impl PendingQueue {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Target> {
        self.targets.iter()
    }

    pub(crate) fn extend(&mut self, targets: impl IntoIterator<Item = Target>) {
        self.targets.extend(targets);
    }

    /// Take the next batch from the front of the queue.
    ///
    /// Targets are never split. With a byte limit, we stop before the target
    /// that would exceed it. When the very first target doesn't fit on its own
    /// it is removed and handed back in the error, so the targets behind it
    /// can still be drained.
    pub(crate) fn take_batch(&mut self, limit: BatchLimit) -> Result<Vec<Target>> {
        let count = match limit {
            BatchLimit::Count(0) => {
                return Err(Error::Configuration("batch limit must be positive".into()));
            }
            BatchLimit::Count(max) => max.min(self.targets.len()),
            BatchLimit::Bytes(max_bytes) => {
                let mut size = 0;
                let count = self
                    .targets
                    .iter()
                    .take_while(|target| {
                        let target_size = target.encoded_len();
                        if size + target_size > max_bytes {
                            false
                        } else {
                            size += target_size;
                            true
                        }
                    })
                    .count();

                if count == 0
                    && let Some(target) = self.targets.pop_front()
                {
                    return Err(Error::TargetTooLarge {
                        target_len: target.encoded_len(),
                        target,
                        limit: max_bytes,
                    });
                }
                count
            }
        };

        Ok(self.targets.drain(..count).collect())
    }

    /// Put a batch back to the front, keeping its order.
    pub(crate) fn restore_front(&mut self, batch: Vec<Target>) {
        for target in batch.into_iter().rev() {
            self.targets.push_front(target);
        }
    }
}

impl<'a> IntoIterator for &'a PendingQueue {
    type Item = &'a Target;
    type IntoIter = vec_deque::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
