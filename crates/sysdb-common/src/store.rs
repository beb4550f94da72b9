//! Store access for SysDB.
//!
//! [`SysDb`] is the only way the reconciler and mutator touch state. The
//! production implementation is [`crate::RedisStore`]; [`MemoryStore`] backs
//! tests and mirrors Redis key matching.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{SysdbError, SysdbResult};

/// Key-value access to SysDB.
///
/// All calls are single round trips with no retry. `set` overwrites
/// unconditionally and `scan` returns keys in no particular order.
#[async_trait]
pub trait SysDb: Send + Sync {
    /// Returns the value at `key`, or `None` if the key does not exist.
    ///
    /// A value that exists but is not UTF-8 text fails with
    /// [`SysdbError::MalformedRecord`] for that key.
    async fn get(&self, key: &str) -> SysdbResult<Option<String>>;

    /// Replaces the value at `key`.
    async fn set(&self, key: &str, value: &str) -> SysdbResult<()>;

    /// Returns every key matching a Redis-style glob pattern.
    async fn scan(&self, pattern: &str) -> SysdbResult<Vec<String>>;
}

/// In-memory SysDb with Redis glob semantics.
///
/// Values are held as bytes like Redis strings. Clones share the same data,
/// so a test can keep a handle while the code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    unavailable: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call succeed (`true`) or fail with
    /// [`SysdbError::StoreUnavailable`] (`false`).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stores raw bytes at `key`, which need not be valid UTF-8.
    pub async fn set_bytes(&self, key: &str, value: &[u8]) -> SysdbResult<()> {
        self.check_available("set")?;
        self.data.lock().await.insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.data.lock().await.is_empty()
    }

    fn check_available(&self, operation: &str) -> SysdbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SysdbError::unavailable(operation, "Connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl SysDb for MemoryStore {
    async fn get(&self, key: &str) -> SysdbResult<Option<String>> {
        self.check_available("get")?;
        match self.data.lock().await.get(key) {
            Some(bytes) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|e| SysdbError::malformed_record(key, e)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> SysdbResult<()> {
        self.set_bytes(key, value.as_bytes()).await
    }

    async fn scan(&self, pattern: &str) -> SysdbResult<Vec<String>> {
        self.check_available("scan")?;
        let data = self.data.lock().await;
        Ok(data
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect())
    }
}

/// Matches `key` against a Redis `KEYS`/`SCAN` glob.
///
/// Supports `*`, `?`, `[abc]`, `[a-z]`, `[^a]` and `\` escapes. As in Redis,
/// `*` also matches `/`.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    match_from(&pattern, &key)
}

fn match_from(pattern: &[char], key: &[char]) -> bool {
    let mut p = 0;
    let mut k = 0;

    while p < pattern.len() {
        match pattern[p] {
            '*' => {
                while p + 1 < pattern.len() && pattern[p + 1] == '*' {
                    p += 1;
                }
                if p + 1 == pattern.len() {
                    return true;
                }
                return (k..=key.len()).any(|start| match_from(&pattern[p + 1..], &key[start..]));
            }
            '?' => {
                if k >= key.len() {
                    return false;
                }
            }
            '[' => {
                if k >= key.len() {
                    return false;
                }
                match match_class(&pattern[p + 1..], key[k]) {
                    Some((matched, consumed)) => {
                        if !matched {
                            return false;
                        }
                        p += consumed;
                    }
                    // Unterminated class matches a literal '['.
                    None => {
                        if key[k] != '[' {
                            return false;
                        }
                    }
                }
            }
            '\\' if p + 1 < pattern.len() => {
                p += 1;
                if k >= key.len() || key[k] != pattern[p] {
                    return false;
                }
            }
            c => {
                if k >= key.len() || key[k] != c {
                    return false;
                }
            }
        }
        p += 1;
        k += 1;
    }

    k == key.len()
}

/// Evaluates a `[...]` class whose body starts at `class[0]`.
///
/// Returns whether `c` matched and how many pattern chars were consumed up to
/// and including the closing `]`.
fn match_class(class: &[char], c: char) -> Option<(bool, usize)> {
    let mut i = 0;
    let negate = class.first() == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < class.len() && class[i] != ']' {
        if class[i] == '\\' && i + 1 < class.len() {
            i += 1;
            matched |= class[i] == c;
        } else if i + 2 < class.len() && class[i + 1] == '-' && class[i + 2] != ']' {
            let (lo, hi) = if class[i] <= class[i + 2] {
                (class[i], class[i + 2])
            } else {
                (class[i + 2], class[i])
            };
            matched |= lo <= c && c <= hi;
            i += 2;
        } else {
            matched |= class[i] == c;
        }
        i += 1;
    }

    if i >= class.len() {
        return None;
    }

    Some((matched != negate, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::INTERFACE_STATUS_PATTERN;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glob_interface_pattern() {
        assert!(glob_match(INTERFACE_STATUS_PATTERN, "sysdb/interface/eth1/status"));
        assert!(!glob_match(INTERFACE_STATUS_PATTERN, "sysdb/interface/eth1/config"));
        assert!(!glob_match(INTERFACE_STATUS_PATTERN, "sysdb/hardware/1/status"));
        // Redis '*' crosses '/' boundaries.
        assert!(glob_match(INTERFACE_STATUS_PATTERN, "sysdb/interface/a/b/status"));
    }

    #[test]
    fn test_glob_wildcards() {
        assert!(glob_match("*", ""));
        assert!(glob_match("eth?", "eth1"));
        assert!(!glob_match("eth?", "eth10"));
        assert!(glob_match("eth[0-3]", "eth2"));
        assert!(!glob_match("eth[0-3]", "eth7"));
        assert!(glob_match("eth[^0]", "eth5"));
        assert!(!glob_match("eth[^0]", "eth0"));
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "axb"));
        assert!(glob_match("a**b", "ab"));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_store_scan() {
        let store = MemoryStore::new();
        store.set("sysdb/interface/eth0/status", "{}").await.unwrap();
        store.set("sysdb/interface/eth1/status", "{}").await.unwrap();
        store.set("sysdb/interface/eth2/config", "{}").await.unwrap();

        let mut keys = store.scan(INTERFACE_STATUS_PATTERN).await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "sysdb/interface/eth0/status".to_string(),
                "sysdb/interface/eth1/status".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_memory_store_unavailable() {
        let store = MemoryStore::new();
        store.set_available(false);

        let err = store.scan("*").await.unwrap_err();
        assert!(err.is_store_failure());
        assert!(store.get("k").await.is_err());
        assert!(store.set("k", "v").await.is_err());
        assert_eq!(store.write_count(), 0);

        store.set_available(true);
        assert!(store.scan("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_utf8_value_is_malformed_record() {
        let store = MemoryStore::new();
        store
            .set_bytes("sysdb/interface/eth5/status", &[0xff, 0xfe])
            .await
            .unwrap();

        let err = store.get("sysdb/interface/eth5/status").await.unwrap_err();
        assert!(matches!(err, SysdbError::MalformedRecord { .. }));
        assert!(!err.is_store_failure());
        // Still enumerable.
        assert_eq!(store.scan("sysdb/*").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.set("k", "v").await.unwrap();
        assert_eq!(handle.get("k").await.unwrap(), Some("v".to_string()));
    }
}
