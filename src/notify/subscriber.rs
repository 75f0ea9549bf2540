//! Subscriber-based notifications for toggle changes.

use std::sync::Arc;
use tokio::sync::RwLock;

type Callback = Box<dyn Fn(&[String]) + Send + Sync>;

/// Handle for a subscription that can be dropped to unsubscribe.
pub struct SubscriptionHandle {
    id: usize,
    registry: Arc<RwLock<SubscriberRegistryInner>>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        let id = self.id;
        if let Ok(mut inner) = self.registry.try_write() {
            inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
            return;
        }

        // Contended: finish asynchronously when a runtime is around.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let registry = Arc::clone(&self.registry);
            handle.spawn(async move {
                let mut inner = registry.write().await;
                inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
            });
        }
    }
}

struct SubscriberRegistryInner {
    subscribers: Vec<(usize, Callback)>,
    next_id: usize,
}

/// Registry of callbacks invoked with the names of toggles whose effective
/// value changed in a publication.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::notify::SubscriberRegistry;
///
/// # async fn example() {
/// let registry = SubscriberRegistry::new();
///
/// let handle = registry
///     .subscribe(|changed: &[String]| println!("toggles changed: {:?}", changed))
///     .await;
///
/// registry.notify_all(&["storage".to_string()]).await;
///
/// drop(handle);
/// # }
/// ```
pub struct SubscriberRegistry {
    inner: Arc<RwLock<SubscriberRegistryInner>>,
}

impl SubscriberRegistry {
    /// Create a new subscriber registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SubscriberRegistryInner {
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a callback. Dropping the returned handle unsubscribes.
    pub async fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));

        SubscriptionHandle {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Call every callback, in subscription order.
    pub async fn notify_all(&self, changed: &[String]) {
        let inner = self.inner.read().await;
        for (_id, callback) in &inner.subscribers {
            callback(changed);
        }
    }

    /// Get the number of active subscribers.
    pub async fn subscriber_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.subscribers.len()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SubscriberRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
