//! Form usability and submission recording.
//!
//! Whether a form accepts submissions is derived from three stored fields
//! (status, cap, expiry) by [`check_usable`]. The stored `status` is never
//! rewritten when a form expires or fills up, so the predicate is the single
//! place where "usable" is decided.

use crate::error::{Result, ServiceError};
use crate::store::{self, to_document, Collection, CommitOutcome, DocumentStore, WriteBatch};
use chrono::{DateTime, Utc};
use common::model::form::{Form, FormStatus};
use common::model::submission::{Submission, SubmissionStatus};
use common::requests::SubmitForm;
use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use uuid::Uuid;

pub const FORM_ID_LEN: usize = 16;

/// Why a form refuses submissions. Variants are in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unusable {
    Inactive,
    CapReached,
    Expired,
}

impl From<Unusable> for ServiceError {
    fn from(reason: Unusable) -> Self {
        match reason {
            Unusable::Inactive => {
                ServiceError::FailedPrecondition("Form is inactive or does not exist.".to_string())
            }
            Unusable::CapReached => {
                ServiceError::ResourceExhausted("Submission limit reached.".to_string())
            }
            Unusable::Expired => ServiceError::FailedPrecondition("Form has expired.".to_string()),
        }
    }
}

/// Effective cap; a stored 0 means uncapped.
pub fn submission_cap(form: &Form) -> Option<u64> {
    form.max_submissions.filter(|max| *max > 0)
}

/// Status first, then cap, then expiry.
pub fn check_usable(form: &Form, now: DateTime<Utc>) -> std::result::Result<(), Unusable> {
    if form.status != FormStatus::Active {
        return Err(Unusable::Inactive);
    }
    if submission_cap(form).is_some_and(|max| form.submission_count >= max) {
        return Err(Unusable::CapReached);
    }
    if form.expires_at.is_some_and(|expires_at| expires_at < now) {
        return Err(Unusable::Expired);
    }
    Ok(())
}

pub fn is_usable(form: &Form, now: DateTime<Utc>) -> bool {
    check_usable(form, now).is_ok()
}

/// 16 alphanumeric characters from the OS random source.
pub fn new_form_id() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(FORM_ID_LEN)
        .map(char::from)
        .collect()
}

/// Loads a form and rejects it unless it currently accepts submissions.
pub async fn load_for_submission(
    store: &dyn DocumentStore,
    form_id: &str,
    now: DateTime<Utc>,
) -> Result<Form> {
    let form: Form = store::load(store, Collection::Forms, form_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Form {} does not exist.", form_id)))?;
    if let Err(reason) = check_usable(&form, now) {
        warn!("Form {} rejected submission: {:?}", form_id, reason);
        return Err(reason.into());
    }
    Ok(form)
}

/// Writes a pending submission and bumps the form counter in one batch.
/// Company and template are taken from the stored form, never the caller.
pub async fn record_submission(
    store: &dyn DocumentStore,
    form: &Form,
    request: SubmitForm,
    now: DateTime<Utc>,
) -> Result<String> {
    let submission = Submission {
        id: Uuid::new_v4().simple().to_string(),
        form_id: form.id.clone(),
        company_id: form.company_id.clone(),
        template_id: form.template_id.clone(),
        employee_data: request.employee_data,
        photo_url: request.photo_url,
        qr_code_data: None,
        status: SubmissionStatus::Pending,
        submitted_at: now,
        approved_at: None,
        approved_by: None,
        card_url: None,
    };

    let batch = WriteBatch::new().insert(
        Collection::Submissions,
        &submission.id,
        to_document(&submission)?,
    );
    let batch = match submission_cap(form) {
        Some(max) => batch.increment_below(
            Collection::Forms,
            &form.id,
            "submissionCount",
            1,
            i64::try_from(max).unwrap_or(i64::MAX),
        ),
        None => batch.increment(Collection::Forms, &form.id, "submissionCount", 1),
    };

    match store.commit(batch).await? {
        CommitOutcome::Committed => {
            info!("Recorded submission {} for form {}", submission.id, form.id);
            Ok(submission.id)
        }
        CommitOutcome::GuardFailed { .. } => {
            warn!("Form {} filled up before submission could be recorded", form.id);
            Err(Unusable::CapReached.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn form(status: FormStatus, max: Option<u64>, count: u64, expires_at: Option<DateTime<Utc>>) -> Form {
        Form {
            id: "f1".into(),
            company_id: "c1".into(),
            template_id: "t1".into(),
            public_url: "http://localhost/form/f1".into(),
            expires_at,
            max_submissions: max,
            submission_count: count,
            status,
            created_by: "admin".into(),
            created_at: Utc::now(),
        }
    }

    fn request() -> SubmitForm {
        SubmitForm {
            form_id: "f1".into(),
            employee_data: BTreeMap::from([("name".to_string(), json!("Ada"))]),
            photo_url: None,
        }
    }

    #[test]
    fn status_checked_before_cap_and_expiry() {
        let now = Utc::now();
        let past = Some(now - Duration::days(1));
        let closed = form(FormStatus::Closed, Some(1), 5, past);
        assert_eq!(check_usable(&closed, now), Err(Unusable::Inactive));
    }

    #[test]
    fn cap_checked_before_expiry() {
        let now = Utc::now();
        let full_and_expired = form(FormStatus::Active, Some(2), 2, Some(now - Duration::hours(1)));
        assert_eq!(check_usable(&full_and_expired, now), Err(Unusable::CapReached));
    }

    #[test]
    fn expired_form_rejected_under_cap() {
        let now = Utc::now();
        let expired = form(FormStatus::Active, Some(10), 0, Some(now - Duration::seconds(1)));
        assert_eq!(check_usable(&expired, now), Err(Unusable::Expired));
        assert!(ServiceError::from(Unusable::Expired).to_string().contains("expired"));
    }

    #[test]
    fn zero_cap_and_future_expiry_are_usable() {
        let now = Utc::now();
        assert!(is_usable(&form(FormStatus::Active, Some(0), 99, None), now));
        assert!(is_usable(
            &form(FormStatus::Active, None, 0, Some(now + Duration::days(3))),
            now
        ));
    }

    #[test]
    fn form_ids_are_long_and_alphanumeric() {
        let a = new_form_id();
        let b = new_form_id();
        assert_eq!(a.len(), FORM_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn missing_form_is_not_found() {
        let store = MemoryStore::new();
        let err = load_for_submission(&store, "nope", Utc::now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn cap_of_n_rejects_the_next_submission() {
        let store = MemoryStore::new();
        let f = form(FormStatus::Active, Some(2), 0, None);
        store
            .insert(Collection::Forms, "f1", to_document(&f).unwrap())
            .await
            .unwrap();

        for _ in 0..2 {
            let loaded = load_for_submission(&store, "f1", Utc::now()).await.unwrap();
            record_submission(&store, &loaded, request(), Utc::now())
                .await
                .unwrap();
        }
        let err = load_for_submission(&store, "f1", Utc::now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ResourceExhausted(_)));

        let submissions = store
            .find_by(Collection::Submissions, "formId", &json!("f1"))
            .await
            .unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0]["status"], json!("pending"));
        assert_eq!(submissions[0]["companyId"], json!("c1"));
    }

    #[tokio::test]
    async fn stale_form_snapshot_cannot_overshoot_cap() {
        let store = MemoryStore::new();
        let f = form(FormStatus::Active, Some(1), 0, None);
        store
            .insert(Collection::Forms, "f1", to_document(&f).unwrap())
            .await
            .unwrap();

        // Both callers validated against the same snapshot.
        let first = record_submission(&store, &f, request(), Utc::now()).await;
        let second = record_submission(&store, &f, request(), Utc::now()).await;

        assert!(first.is_ok());
        assert!(matches!(second, Err(ServiceError::ResourceExhausted(_))));
        let stored = store.get(Collection::Forms, "f1").await.unwrap().unwrap();
        assert_eq!(stored["submissionCount"], json!(1));
    }
}
