//! Interface state reconciler.
//!
//! Joins each interface's status record with its config record. Enumeration
//! is anchored on status keys: an interface that has been configured but
//! never reported by the control plane is not listed.

use std::sync::Arc;

use sysdb_common::schema::INTERFACE_STATUS_PATTERN;
use sysdb_common::{
    config_key, parse_record, status_key, ConfigRecord, RecordKind, StatusRecord, SysDb,
    SysdbError, SysdbKey, SysdbResult,
};
use tracing::{debug, instrument};

use crate::types::InterfaceView;

/// Read-only view builder over SysDB.
pub struct IntfReconciler {
    db: Arc<dyn SysDb>,
}

impl IntfReconciler {
    pub fn new(db: Arc<dyn SysDb>) -> Self {
        Self { db }
    }

    /// Builds one view per interface status record.
    ///
    /// Order follows the store's enumeration and is not stable; use
    /// [`sort_by_name`] for deterministic output. Missing or malformed
    /// records fall back to defaults and keys that do not split into
    /// `sysdb/interface/<name>/status` are skipped. Only a failing store
    /// call is an error.
    #[instrument(skip(self))]
    pub async fn show_interfaces(&self) -> SysdbResult<Vec<InterfaceView>> {
        let keys = self.db.scan(INTERFACE_STATUS_PATTERN).await?;
        debug!("Found {} status keys", keys.len());

        let mut views = Vec::with_capacity(keys.len());
        for raw_key in keys {
            let key = match SysdbKey::parse(&raw_key) {
                Ok(key) if key.is_interface_status() => key,
                Ok(_) => {
                    debug!("Skipping non-status key {}", raw_key);
                    continue;
                }
                Err(e) => {
                    debug!("Skipping key: {}", e);
                    continue;
                }
            };

            let status = self.read_status(&raw_key).await?;
            let config = self.read_config(&key.sibling(RecordKind::Config)).await?;
            views.push(InterfaceView::from_records(key.id, status, config));
        }

        Ok(views)
    }

    /// Builds the view for a single interface.
    ///
    /// Returns `None` when the interface has no status record, matching
    /// [`show_interfaces`](Self::show_interfaces) even if a config record
    /// exists.
    #[instrument(skip(self))]
    pub async fn show_interface(&self, name: &str) -> SysdbResult<Option<InterfaceView>> {
        let key = status_key(name);
        let status = match self.db.get(&key).await {
            Ok(None) => return Ok(None),
            Ok(Some(raw)) => parse_record::<StatusRecord>(&key, Some(&raw)),
            // The key exists; only its value is unusable.
            Err(e @ SysdbError::MalformedRecord { .. }) => {
                debug!("Treating record as absent: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        let config = self.read_config(&config_key(name)).await?;
        Ok(Some(InterfaceView::from_records(name, status, config)))
    }

    async fn read_status(&self, key: &str) -> SysdbResult<Option<StatusRecord>> {
        Ok(parse_record(key, self.read_raw(key).await?.as_deref()))
    }

    async fn read_config(&self, key: &str) -> SysdbResult<Option<ConfigRecord>> {
        Ok(parse_record(key, self.read_raw(key).await?.as_deref()))
    }

    /// Fetches a raw value. A value the store cannot return as text reads as
    /// absent; any other store failure is returned.
    async fn read_raw(&self, key: &str) -> SysdbResult<Option<String>> {
        match self.db.get(key).await {
            Ok(raw) => Ok(raw),
            Err(e @ SysdbError::MalformedRecord { .. }) => {
                debug!("Treating record as absent: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Sorts views by interface name.
///
/// Names with a common prefix compare by their numeric suffix, so `eth2`
/// sorts before `eth10`.
pub fn sort_by_name(views: &mut [InterfaceView]) {
    views.sort_by(|a, b| name_sort_key(&a.name).cmp(&name_sort_key(&b.name)));
}

fn name_sort_key(name: &str) -> (&str, Option<u64>, &str) {
    let digits_at = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_at {
        Some(i) => (&name[..i], name[i..].parse().ok(), name),
        None => (name, None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use sysdb_common::MemoryStore;

    use crate::mocks::MockStore;
    use crate::types::AdminState;

    fn view(name: &str) -> InterfaceView {
        InterfaceView::from_records(name, None, None)
    }

    #[test]
    fn test_sort_by_name_numeric_suffix() {
        let mut views = vec![view("eth10"), view("eth2"), view("Loopback0"), view("eth0")];
        sort_by_name(&mut views);
        let names: Vec<&str> = views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Loopback0", "eth0", "eth2", "eth10"]);
    }

    #[tokio::test]
    async fn test_reconciler_is_read_only() {
        let mut mock = MockStore::new();
        mock.expect_scan()
            .with(eq(INTERFACE_STATUS_PATTERN))
            .times(1)
            .returning(|_| Ok(vec!["sysdb/interface/eth0/status".to_string()]));
        mock.expect_get()
            .with(eq("sysdb/interface/eth0/status"))
            .times(1)
            .returning(|_| Ok(Some(r#"{"operStatus":"up","linkStatus":"up"}"#.to_string())));
        mock.expect_get()
            .with(eq("sysdb/interface/eth0/config"))
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_set().never();

        let reconciler = IntfReconciler::new(Arc::new(mock));
        let views = reconciler.show_interfaces().await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].admin_state, AdminState::Disabled);
        assert_eq!(views[0].oper_status, "up");
    }

    #[tokio::test]
    async fn test_malformed_key_is_not_fetched() {
        let mut mock = MockStore::new();
        mock.expect_scan().returning(|_| {
            Ok(vec![
                "sysdb/interface/a/b/status".to_string(),
                "sysdb/interface/eth1/status".to_string(),
            ])
        });
        mock.expect_get()
            .with(eq("sysdb/interface/eth1/status"))
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_get()
            .with(eq("sysdb/interface/eth1/config"))
            .times(1)
            .returning(|_| Ok(None));

        let reconciler = IntfReconciler::new(Arc::new(mock));
        let views = reconciler.show_interfaces().await.unwrap();
        assert_eq!(views, vec![view("eth1")]);
    }

    #[tokio::test]
    async fn test_scan_failure_is_store_unavailable() {
        let mut mock = MockStore::new();
        mock.expect_scan()
            .returning(|_| Err(SysdbError::unavailable("scan", "Connection refused")));
        mock.expect_get().never();

        let reconciler = IntfReconciler::new(Arc::new(mock));
        let err = reconciler.show_interfaces().await.unwrap_err();
        assert!(matches!(err, SysdbError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_get_failure_aborts() {
        let mut mock = MockStore::new();
        mock.expect_scan()
            .returning(|_| Ok(vec!["sysdb/interface/eth0/status".to_string()]));
        mock.expect_get()
            .returning(|_| Err(SysdbError::unavailable("get", "Broken pipe")));

        let reconciler = IntfReconciler::new(Arc::new(mock));
        assert!(reconciler.show_interfaces().await.unwrap_err().is_store_failure());
    }

    #[tokio::test]
    async fn test_unreadable_value_does_not_abort() {
        let mut mock = MockStore::new();
        mock.expect_scan().returning(|_| {
            Ok(vec![
                "sysdb/interface/eth0/status".to_string(),
                "sysdb/interface/eth5/status".to_string(),
            ])
        });
        mock.expect_get()
            .with(eq("sysdb/interface/eth0/status"))
            .returning(|_| Ok(Some(r#"{"operStatus":"up"}"#.to_string())));
        mock.expect_get()
            .with(eq("sysdb/interface/eth5/status"))
            .returning(|key| Err(SysdbError::malformed_record(key, "Invalid UTF-8")));
        mock.expect_get()
            .with(eq("sysdb/interface/eth0/config"))
            .returning(|key| Err(SysdbError::malformed_record(key, "WRONGTYPE")));
        mock.expect_get()
            .with(eq("sysdb/interface/eth5/config"))
            .returning(|_| Ok(None));

        let reconciler = IntfReconciler::new(Arc::new(mock));
        let views = reconciler.show_interfaces().await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].oper_status, "up");
        assert_eq!(views[0].admin_state, AdminState::Disabled);
        assert_eq!(views[1], view("eth5"));
    }

    #[tokio::test]
    async fn test_show_interface_unreadable_status_defaults() {
        let store = MemoryStore::new();
        store.set_bytes(&status_key("eth5"), &[0xc3, 0x28]).await.unwrap();

        let reconciler = IntfReconciler::new(Arc::new(store));
        let shown = reconciler.show_interface("eth5").await.unwrap().unwrap();
        assert_eq!(shown, view("eth5"));
    }

    #[tokio::test]
    async fn test_show_interface_requires_status() {
        let store = MemoryStore::new();
        store
            .set(&config_key("eth7"), r#"{"adminEnabled":true}"#)
            .await
            .unwrap();

        let reconciler = IntfReconciler::new(Arc::new(store.clone()));
        assert_eq!(reconciler.show_interface("eth7").await.unwrap(), None);

        store
            .set(&status_key("eth7"), r#"{"operStatus":"down","reason":"linkDown"}"#)
            .await
            .unwrap();
        let view = reconciler.show_interface("eth7").await.unwrap().unwrap();
        assert_eq!(view.admin_state, AdminState::Enabled);
        assert_eq!(view.oper_status, "down");
        assert_eq!(view.link_status, "unknown");
        assert_eq!(view.reason, "linkDown");
    }

    #[tokio::test]
    async fn test_show_interface_malformed_status_defaults() {
        let store = MemoryStore::new();
        store.set(&status_key("eth5"), "garbage").await.unwrap();

        let reconciler = IntfReconciler::new(Arc::new(store));
        let shown = reconciler.show_interface("eth5").await.unwrap().unwrap();
        assert_eq!(shown, view("eth5"));
    }
}
