//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

pub(crate) const MAX_DEPTH: usize = 1024;

// Thread-local resolution state for circular dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<Vec<(usize, TypeKey)>> = const { RefCell::new(Vec::new()) };
}

/// Guard for one frame of the thread-local resolution stack.
///
/// Frames are tagged with the owning container so resolving the same type
/// through two different containers is not mistaken for a cycle.
pub(crate) struct ResolutionGuard {
    owner: usize,
    key: TypeKey,
}

impl ResolutionGuard {
    /// Pushes `key` for `owner`, failing if that frame is already on the
    /// stack or the stack is `max_depth` frames deep.
    pub(crate) fn enter(owner: usize, key: TypeKey, max_depth: usize, detect_cycles: bool) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Circular detection BEFORE pushing the new key
            if detect_cycles {
                if let Some(start) = stack.iter().position(|&(o, k)| o == owner && k == key) {
                    let mut path: Vec<&'static str> = stack[start..]
                        .iter()
                        .filter(|(o, _)| *o == owner)
                        .map(|(_, k)| k.name())
                        .collect();
                    path.push(key.name());
                    return Err(DiError::Circular(path));
                }
            }

            // Depth guard
            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push((owner, key));
            Ok(())
        })?;

        Ok(Self { owner, key })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();
            if let Some(last) = stack.pop() {
                debug_assert!(last.0 == self.owner && last.1 == self.key);
            }
        });
    }
}
