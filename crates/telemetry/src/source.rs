//! Data source - point lookups into a live value tree.
//!
//! The pipeline only ever asks one question of its source: "what is the
//! current value at this dotted path?". `ValueTree` is the in-process
//! implementation, fed by a `SnapshotFeed` or written directly, and it
//! broadcasts which paths changed so the trigger can subscribe to them.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::trace;

use crate::trigger::ChangeStream;

/// Change broadcast capacity; slow subscribers skip missed events
const CHANGE_BUFFER: usize = 256;

/// Source of current values, resolved by dotted path.
pub trait DataSource: Send + Sync {
    /// Current value at `path`, or `None` when nothing resolves there.
    ///
    /// A stored JSON `null`, `0`, `false` or `""` is a present value.
    fn get_value(&self, path: &str) -> Option<Value>;
}

impl DataSource for Value {
    fn get_value(&self, path: &str) -> Option<Value> {
        lookup(self, path).cloned()
    }
}

/// Resolve a dotted path against a JSON tree.
///
/// Segments index object keys, or array positions when the node is an array.
/// The empty path resolves to the root.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at a dotted path, creating intermediate objects.
///
/// Non-object nodes along the way are replaced by objects.
fn insert(root: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *root = value;
        return;
    }
    let mut node = root;
    for segment in path.split('.') {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map.entry(segment).or_insert(Value::Null),
            _ => return,
        };
    }
    *node = value;
}

fn is_ancestor(parent: &str, child: &str) -> bool {
    parent.is_empty()
        || child
            .strip_prefix(parent)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// How a written path relates to a followed path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    /// The followed path itself, or something below it, was written
    Direct,
    /// Something above the followed path was written, possibly the root
    Enclosing,
    Unrelated,
}

fn overlap(written: &str, followed: &str) -> Overlap {
    if written == followed || is_ancestor(followed, written) {
        Overlap::Direct
    } else if is_ancestor(written, followed) {
        Overlap::Enclosing
    } else {
        Overlap::Unrelated
    }
}

/// Notification that the value at `path` (or below it) was written.
///
/// An empty path means the whole tree was replaced. `root` is the document
/// as it was right after the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: String,
    pub root: Arc<Value>,
}

/// Live in-memory value tree.
///
/// The document is shared copy-on-write with pending change events, so a
/// write only clones it while a subscriber still holds an older version.
#[derive(Debug)]
pub struct ValueTree {
    root: RwLock<Arc<Value>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for ValueTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Create a tree holding `root`
    pub fn from_value(root: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            root: RwLock::new(Arc::new(root)),
            changes,
        }
    }

    /// Write one value and announce the change.
    pub fn set(&self, path: &str, value: Value) {
        let mut root = self.root.write();
        insert(Arc::make_mut(&mut root), path, value);
        // Published under the lock so events arrive in write order
        self.publish(path, &root);
    }

    /// Swap in a whole new document and announce a root change.
    pub fn replace(&self, document: Value) {
        let mut root = self.root.write();
        *root = Arc::new(document);
        self.publish("", &root);
    }

    /// Copy of the current document
    pub fn snapshot(&self) -> Value {
        Value::clone(&self.root.read())
    }

    /// Subscribe to raw change events
    pub fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    /// Stream of updates touching `path`.
    ///
    /// Subscribes immediately, so changes made after this call are seen even
    /// if the stream is polled later.
    pub fn stream(&self, path: impl Into<String>) -> PathStream {
        let path = path.into();
        let root = self.root.read();
        PathStream {
            last: lookup(&root, &path).cloned(),
            rx: self.changes.subscribe(),
            path,
        }
    }

    fn publish(&self, path: &str, root: &Arc<Value>) {
        // No subscribers is fine
        let _ = self.changes.send(ChangeEvent {
            path: path.to_string(),
            root: Arc::clone(root),
        });
    }
}

impl DataSource for ValueTree {
    fn get_value(&self, path: &str) -> Option<Value> {
        lookup(&self.root.read(), path).cloned()
    }
}

/// Change stream over one path of a `ValueTree`.
///
/// Yields the value at the path, as of the write, every time the path or
/// one of its descendants is written. Writes above the path (including a
/// whole-document `replace`) only yield when they leave a value at the path
/// that differs from the last one seen, so a feed re-reading an unchanged
/// document does not fire. A directly written path that does not resolve
/// yields `null`.
#[derive(Debug)]
pub struct PathStream {
    path: String,
    last: Option<Value>,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl PathStream {
    /// Path this stream follows
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl ChangeStream for PathStream {
    async fn next_change(&mut self) -> Option<Value> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    let relation = overlap(&event.path, &self.path);
                    if relation == Overlap::Unrelated {
                        continue;
                    }
                    let current = lookup(&event.root, &self.path).cloned();
                    if relation == Overlap::Enclosing
                        && (current.is_none() || current == self.last)
                    {
                        continue;
                    }
                    self.last.clone_from(&current);
                    return Some(current.unwrap_or(Value::Null));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    trace!(path = %self.path, skipped, "change stream lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn vessel() -> Value {
        json!({
            "navigation": {
                "speedOverGround": 5.14,
                "datetime": "2024-06-01T12:00:00Z",
                "anchor": { "set": false, "radius": 0 },
                "courses": [{ "value": 1.2 }, { "value": 2.4 }]
            },
            "name": "",
            "mmsi": null
        })
    }

    #[test]
    fn test_lookup_nested() {
        let root = vessel();
        assert_eq!(root.get_value("navigation.speedOverGround"), Some(json!(5.14)));
        assert_eq!(root.get_value("navigation.courses.1.value"), Some(json!(2.4)));
        assert_eq!(root.get_value(""), Some(root.clone()));
    }

    #[test]
    fn test_falsy_values_are_present() {
        let root = vessel();
        assert_eq!(root.get_value("navigation.anchor.set"), Some(json!(false)));
        assert_eq!(root.get_value("navigation.anchor.radius"), Some(json!(0)));
        assert_eq!(root.get_value("name"), Some(json!("")));
        assert_eq!(root.get_value("mmsi"), Some(Value::Null));
    }

    #[test]
    fn test_missing_paths_are_absent() {
        let root = vessel();
        assert_eq!(root.get_value("navigation.headingTrue"), None);
        assert_eq!(root.get_value("navigation.speedOverGround.value"), None);
        assert_eq!(root.get_value("navigation.courses.7"), None);
        assert_eq!(root.get_value("navigation.courses.x"), None);
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let tree = ValueTree::new();
        tree.set("environment.wind.speedApparent", json!(7.5));
        assert_eq!(
            tree.get_value("environment.wind"),
            Some(json!({ "speedApparent": 7.5 }))
        );

        // Scalars on the way are replaced
        tree.set("environment.wind.speedApparent.value", json!(8.0));
        assert_eq!(
            tree.get_value("environment.wind.speedApparent.value"),
            Some(json!(8.0))
        );
    }

    #[test]
    fn test_replace_swaps_document() {
        let tree = ValueTree::new();
        tree.set("a", json!(1));
        tree.replace(vessel());
        assert_eq!(tree.get_value("a"), None);
        assert_eq!(tree.snapshot(), vessel());
    }

    #[test]
    fn test_overlap() {
        let followed = "navigation.datetime";
        assert_eq!(overlap("navigation.datetime", followed), Overlap::Direct);
        assert_eq!(overlap("navigation.datetime.value", followed), Overlap::Direct);
        assert_eq!(overlap("navigation", followed), Overlap::Enclosing);
        assert_eq!(overlap("", followed), Overlap::Enclosing);
        assert_eq!(overlap("navigation.date", followed), Overlap::Unrelated);
        assert_eq!(overlap("environment", followed), Overlap::Unrelated);
        assert_eq!(overlap("anything", ""), Overlap::Direct);
    }

    #[tokio::test]
    async fn test_path_stream_yields_matching_changes() {
        let tree = Arc::new(ValueTree::new());
        let mut stream = tree.stream("navigation.datetime");
        assert_eq!(stream.path(), "navigation.datetime");

        tree.set("environment.depth", json!(12.0));
        tree.set("navigation.datetime", json!("t1"));
        tree.replace(json!({ "navigation": { "datetime": "t2" } }));

        assert_eq!(stream.next_change().await, Some(json!("t1")));
        assert_eq!(stream.next_change().await, Some(json!("t2")));

        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next_change()).await;
        assert!(pending.is_err(), "unrelated change must not be yielded");
    }

    #[tokio::test]
    async fn test_path_stream_yields_value_as_written() {
        let tree = ValueTree::new();
        let mut stream = tree.stream("navigation.datetime");

        tree.set("navigation.datetime", json!("t0"));
        tree.set("navigation.datetime", json!("t1"));
        tree.set("navigation.datetime", json!("t2"));

        assert_eq!(stream.next_change().await, Some(json!("t0")));
        assert_eq!(stream.next_change().await, Some(json!("t1")));
        assert_eq!(stream.next_change().await, Some(json!("t2")));
        assert_eq!(tree.get_value("navigation.datetime"), Some(json!("t2")));
    }

    #[tokio::test]
    async fn test_path_stream_repeated_direct_writes_fire() {
        let tree = ValueTree::new();
        let mut stream = tree.stream("navigation.datetime");

        tree.set("navigation.datetime", json!("t"));
        tree.set("navigation.datetime", json!("t"));

        assert_eq!(stream.next_change().await, Some(json!("t")));
        assert_eq!(stream.next_change().await, Some(json!("t")));
    }

    #[tokio::test]
    async fn test_replace_without_trigger_path_does_not_fire() {
        let tree = ValueTree::new();
        let mut stream = tree.stream("navigation.datetime");

        tree.replace(json!({ "navigation": { "speedOverGround": 5.14 } }));
        tree.set("navigation", json!({ "headingTrue": 1.0 }));

        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next_change()).await;
        assert!(pending.is_err(), "no trigger value, nothing to yield");
    }

    #[tokio::test]
    async fn test_replace_fires_only_when_trigger_value_changes() {
        let tree = ValueTree::from_value(json!({ "navigation": { "datetime": "t1" } }));
        let mut stream = tree.stream("navigation.datetime");

        // Same document re-read by a feed
        tree.replace(json!({ "navigation": { "datetime": "t1", "speedOverGround": 1.0 } }));
        tree.replace(json!({ "navigation": { "datetime": "t2" } }));
        tree.replace(json!({ "navigation": { "datetime": "t2" } }));
        tree.replace(json!({ "navigation": { "datetime": "t3" } }));

        assert_eq!(stream.next_change().await, Some(json!("t2")));
        assert_eq!(stream.next_change().await, Some(json!("t3")));

        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next_change()).await;
        assert!(pending.is_err());
    }
}
