use tracing::{debug, info};

use crate::AppError;
use crate::notify::{Alert, AlertSink};
use crate::source::NotificationRecord;
use crate::watermark::{EPOCH, Watermark, WatermarkStore};

pub fn matches_filter(record: &NotificationRecord, prefix: &str) -> bool {
    record.repository.full_name.starts_with(prefix)
}

pub fn alert_for(record: &NotificationRecord) -> Alert {
    Alert {
        title: format!("{} {}", record.reason, record.subject.title),
        subtitle: record.repository.name.clone(),
        link: record.subject.url.clone(),
    }
}

/// Alerts on records newer than `watermark` whose repository matches `prefix`
/// and returns the advanced in-memory watermark.
///
/// Records are visited in the order given and compared against the watermark as
/// it advances, so after an alert only strictly newer records can fire. The store
/// is touched after every record, which persists wall-clock "now" rather than the
/// returned value. An epoch watermark means nothing has been seen yet: the store is
/// touched once and nothing is alerted. An empty list touches nothing.
pub async fn process(
    records: &[NotificationRecord],
    watermark: Watermark,
    prefix: &str,
    store: &mut dyn WatermarkStore,
    sink: &mut dyn AlertSink,
) -> Result<Watermark, AppError> {
    if records.is_empty() {
        debug!("no notifications; watermark left as is");
        return Ok(watermark);
    }

    if watermark == EPOCH {
        info!(
            count = records.len(),
            "first run; current notifications treated as already seen"
        );
        store.touch()?;
        return Ok(watermark);
    }

    let mut latest = watermark;
    let mut alerted = 0usize;
    for record in records {
        if record.updated_at > latest && matches_filter(record, prefix) {
            let alert = alert_for(record);
            info!(repo = %record.repository.full_name, "{}", alert.title);
            sink.dispatch(&alert).await;
            latest = record.updated_at;
            alerted += 1;
        }
        store.touch()?;
    }
    debug!(alerted, total = records.len(), %latest, "notifications processed");
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::{Clock, ManualClock, MemoryWatermarkStore};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use github_notifier_shared::api::{RepositoryDto, SubjectDto};
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingSink {
        alerts: Vec<Alert>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn dispatch(&mut self, alert: &Alert) {
            self.alerts.push(alert.clone());
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn record(full_name: &str, updated_at: DateTime<Utc>, title: &str) -> NotificationRecord {
        let (_, name) = full_name.split_once('/').unwrap_or(("", full_name));
        NotificationRecord {
            unread: true,
            reason: "mention".into(),
            updated_at,
            subject: SubjectDto {
                title: title.into(),
                url: Some(format!("https://api.github.com/repos/{full_name}/issues/1")),
            },
            url: "https://api.github.com/notifications/threads/1".into(),
            repository: RepositoryDto {
                name: name.into(),
                full_name: full_name.into(),
            },
        }
    }

    fn store_at(watermark: Option<DateTime<Utc>>) -> (Arc<ManualClock>, MemoryWatermarkStore) {
        let clock = Arc::new(ManualClock::new(base() + Duration::days(1)));
        let store = match watermark {
            Some(w) => MemoryWatermarkStore::with_value(clock.clone(), w),
            None => MemoryWatermarkStore::new(clock.clone()),
        };
        (clock, store)
    }

    #[tokio::test]
    async fn first_run_alerts_nothing_but_creates_watermark() {
        let (clock, mut store) = store_at(None);
        let mut sink = RecordingSink::default();
        let records = vec![
            record("acme/a", base(), "one"),
            record("acme/b", base() + Duration::hours(1), "two"),
            record("acme/c", base() + Duration::hours(2), "three"),
        ];

        let out = process(&records, EPOCH, "", &mut store, &mut sink)
            .await
            .unwrap();

        assert!(sink.alerts.is_empty());
        assert_eq!(out, EPOCH);
        assert_eq!(store.touches(), 1);
        assert_eq!(store.read().unwrap(), clock.now());
    }

    #[tokio::test]
    async fn only_records_newer_than_watermark_alert() {
        let w = base();
        let (_, mut store) = store_at(Some(w));
        let mut sink = RecordingSink::default();
        let records = vec![
            record("acme/old", w - Duration::minutes(5), "older"),
            record("acme/same", w, "equal"),
            record("acme/new", w + Duration::minutes(1), "newer"),
            record("acme/newest", w + Duration::minutes(2), "newest"),
        ];

        let out = process(&records, w, "", &mut store, &mut sink)
            .await
            .unwrap();

        let titles: Vec<_> = sink.alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["mention newer", "mention newest"]);
        assert_eq!(out, w + Duration::minutes(2));
    }

    #[tokio::test]
    async fn prefix_filter_is_exact_prefix() {
        let w = base();
        let (_, mut store) = store_at(Some(w));
        let mut sink = RecordingSink::default();
        let records = vec![record("foobar/x", w + Duration::minutes(1), "hit")];

        process(&records, w, "oob", &mut store, &mut sink)
            .await
            .unwrap();
        assert!(sink.alerts.is_empty());

        process(&records, w, "foo", &mut store, &mut sink)
            .await
            .unwrap();
        assert_eq!(sink.alerts.len(), 1);
    }

    #[tokio::test]
    async fn unmatched_records_do_not_advance_watermark() {
        let w = base();
        let (_, mut store) = store_at(Some(w));
        let mut sink = RecordingSink::default();
        let records = vec![
            record("acme/app", w + Duration::minutes(1), "wanted"),
            record("other/app", w + Duration::minutes(9), "filtered"),
        ];

        let out = process(&records, w, "acme/", &mut store, &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.alerts.len(), 1);
        assert_eq!(out, w + Duration::minutes(1));
    }

    #[tokio::test]
    async fn newest_first_order_suppresses_older_records_in_same_tick() {
        let w = base();
        let (_, mut store) = store_at(Some(w));
        let mut sink = RecordingSink::default();
        let records = vec![
            record("acme/app", w + Duration::minutes(10), "latest"),
            record("acme/app", w + Duration::minutes(5), "earlier"),
        ];

        process(&records, w, "", &mut store, &mut sink)
            .await
            .unwrap();

        let titles: Vec<_> = sink.alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["mention latest"]);
    }

    #[tokio::test]
    async fn touches_after_every_record_with_wall_clock_time() {
        let w = base();
        let (clock, mut store) = store_at(Some(w));
        let mut sink = RecordingSink::default();
        let records = vec![
            record("acme/a", w + Duration::minutes(1), "a"),
            record("acme/b", w - Duration::minutes(1), "b"),
            record("zzz/c", w + Duration::minutes(2), "c"),
        ];

        let out = process(&records, w, "acme/", &mut store, &mut sink)
            .await
            .unwrap();

        assert_eq!(store.touches(), 3);
        // the persisted value is the clock, not the logical watermark
        assert_eq!(store.read().unwrap(), clock.now());
        assert_ne!(store.read().unwrap(), out);
    }

    #[tokio::test]
    async fn empty_input_touches_nothing() {
        let w = base();
        let (_, mut store) = store_at(Some(w));
        let mut sink = RecordingSink::default();

        let out = process(&[], w, "", &mut store, &mut sink).await.unwrap();

        assert_eq!(out, w);
        assert_eq!(store.touches(), 0);
        assert_eq!(store.read().unwrap(), w);

        let (_, mut fresh) = store_at(None);
        process(&[], EPOCH, "", &mut fresh, &mut sink)
            .await
            .unwrap();
        assert_eq!(fresh.touches(), 0);
    }

    #[test]
    fn alert_uses_reason_title_repo_name_and_subject_link() {
        let r = record("acme/widgets", base(), "Fix build");
        let alert = alert_for(&r);
        assert_eq!(alert.title, "mention Fix build");
        assert_eq!(alert.subtitle, "widgets");
        assert_eq!(
            alert.link.as_deref(),
            Some("https://api.github.com/repos/acme/widgets/issues/1")
        );
    }
}
