use events_types::duck::Condition;

use super::StorageStatus;
use super::STORAGE_CONDITION_SET;
use super::STORAGE_NOTIFICATION_READY;
use super::STORAGE_PULL_SUBSCRIPTION_READY;
use super::STORAGE_TOPIC_READY;

impl StorageStatus {
    pub fn get_condition(&self, condition_type: &str) -> Option<&Condition> {
        STORAGE_CONDITION_SET.get_condition(self, condition_type)
    }

    /// Ready only when subscription, topic and notification all are
    pub fn is_ready(&self) -> bool {
        STORAGE_CONDITION_SET.is_happy(self)
    }

    pub fn initialize_conditions(&mut self) {
        STORAGE_CONDITION_SET.manage(self).initialize_conditions();
    }

    pub fn mark_pull_subscription_failed(&mut self, reason: &str, message: &str) {
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_false(STORAGE_PULL_SUBSCRIPTION_READY, reason, message);
    }

    pub fn mark_pull_subscription_unknown(&mut self, reason: &str, message: &str) {
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_unknown(STORAGE_PULL_SUBSCRIPTION_READY, reason, message);
    }

    pub fn mark_pull_subscription_ready(&mut self) {
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_true(STORAGE_PULL_SUBSCRIPTION_READY);
    }

    pub fn mark_topic_failed(&mut self, reason: &str, message: &str) {
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_false(STORAGE_TOPIC_READY, reason, message);
    }

    pub fn mark_topic_unknown(&mut self, reason: &str, message: &str) {
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_unknown(STORAGE_TOPIC_READY, reason, message);
    }

    pub fn mark_topic_ready(&mut self) {
        STORAGE_CONDITION_SET.manage(self).mark_true(STORAGE_TOPIC_READY);
    }

    pub fn mark_notification_not_ready(&mut self, reason: &str, message: &str) {
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_false(STORAGE_NOTIFICATION_READY, reason, message);
    }

    /// records the id GCS assigned to the notification
    pub fn mark_notification_ready(&mut self, notification_id: &str) {
        self.notification_id = notification_id.to_owned();
        STORAGE_CONDITION_SET
            .manage(self)
            .mark_true(STORAGE_NOTIFICATION_READY);
    }
}

#[cfg(test)]
mod test {

    use events_types::duck::ConditionStatus;

    use super::StorageStatus;
    use crate::v1alpha1::STORAGE_CONDITION_READY;
    use crate::v1alpha1::STORAGE_NOTIFICATION_READY;
    use crate::v1alpha1::STORAGE_PULL_SUBSCRIPTION_READY;
    use crate::v1alpha1::STORAGE_TOPIC_READY;

    fn status_of(status: &StorageStatus, condition_type: &str) -> Option<ConditionStatus> {
        status.get_condition(condition_type).map(|cond| cond.status)
    }

    fn all_ready() -> StorageStatus {
        let mut status = StorageStatus::default();
        status.initialize_conditions();
        status.mark_pull_subscription_ready();
        status.mark_topic_ready();
        status.mark_notification_ready("n-123");
        status
    }

    #[test]
    fn test_initialized_status_is_unknown() {
        let mut status = StorageStatus::default();
        status.initialize_conditions();

        for condition_type in &[
            STORAGE_CONDITION_READY,
            STORAGE_PULL_SUBSCRIPTION_READY,
            STORAGE_TOPIC_READY,
            STORAGE_NOTIFICATION_READY,
        ] {
            assert_eq!(
                status_of(&status, condition_type),
                Some(ConditionStatus::Unknown),
                "{}",
                condition_type
            );
        }
        assert!(!status.is_ready());
    }

    #[test]
    fn test_ready_when_all_three_ready() {
        let status = all_ready();
        assert!(status.is_ready());
        assert_eq!(status.notification_id, "n-123");
    }

    #[test]
    fn test_any_failure_breaks_ready() {
        type Breaker = fn(&mut StorageStatus);
        let breakers: [Breaker; 3] = [
            |s| s.mark_pull_subscription_failed("PullSubscriptionFailed", "no subscription"),
            |s| s.mark_topic_failed("TopicFailed", "no topic"),
            |s| s.mark_notification_not_ready("NotificationFailed", "no notification"),
        ];

        for breaker in breakers.iter() {
            let mut status = all_ready();
            breaker(&mut status);
            assert!(!status.is_ready());
            assert_eq!(
                status_of(&status, STORAGE_CONDITION_READY),
                Some(ConditionStatus::False)
            );
        }
    }

    #[test]
    fn test_any_unknown_breaks_ready() {
        let mut status = all_ready();
        status.mark_topic_unknown("TopicReconciling", "waiting on topic");
        assert!(!status.is_ready());
        let ready = status.get_condition(STORAGE_CONDITION_READY).expect("ready");
        assert!(ready.is_unknown());
        assert_eq!(ready.reason, "TopicReconciling");

        let mut status = all_ready();
        status.mark_pull_subscription_unknown("PullSubscriptionReconciling", "");
        assert_eq!(
            status_of(&status, STORAGE_CONDITION_READY),
            Some(ConditionStatus::Unknown)
        );
    }

    #[test]
    fn test_recovery_restores_ready() {
        let mut status = all_ready();
        status.mark_topic_failed("TopicFailed", "gone");
        assert!(!status.is_ready());
        status.mark_topic_ready();
        assert!(status.is_ready());
    }
}
