//! Upcoming fixed payment reminders at 3, 1 and 0 days.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use paywatch_entity::finance::FixedPayment;
use paywatch_entity::notification::{
    NewNotification, NotificationPayload, NotificationPriority, NotificationType, RelatedEntity,
};

use super::money;
use crate::calendar::{date_after, days_until_due, turkish_month_name};

/// Emits one reminder per payment when it is exactly 3, 1 or 0 days away.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPaymentRule;

impl FixedPaymentRule {
    /// Evaluate every active payment with a valid due day.
    pub fn evaluate(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        payments: &[FixedPayment],
    ) -> Vec<NewNotification> {
        payments
            .iter()
            .filter(|p| p.is_active)
            .filter_map(|p| {
                let due_day = p.valid_due_day()?;
                let days = days_until_due(today, due_day);
                reminder(user_id, today, p, due_day, days)
            })
            .collect()
    }
}

fn reminder(
    user_id: Uuid,
    today: NaiveDate,
    payment: &FixedPayment,
    due_day: u32,
    days: u32,
) -> Option<NewNotification> {
    let due = date_after(today, days);
    let when = format!("{} {}", due.day(), turkish_month_name(due.month()));
    let name = &payment.name;
    let amount = money(payment.amount);

    let (notification_type, priority, title, message) = match days {
        3 => (
            NotificationType::FixedPayment3Day,
            NotificationPriority::Medium,
            format!("{name} - 3 gün sonra"),
            format!("{name} ödemesi 3 gün sonra ({when}) - {amount} TL"),
        ),
        1 => (
            NotificationType::FixedPayment1Day,
            NotificationPriority::High,
            format!("{name} - Yarın ödeme günü"),
            format!("{name} ödemesi yarın ({when}) - {amount} TL"),
        ),
        0 => (
            NotificationType::FixedPaymentToday,
            NotificationPriority::High,
            format!("{name} - Bugün ödeme günü!"),
            format!("{name} ödemesi bugün yapılmalı - {amount} TL"),
        ),
        _ => return None,
    };

    Some(NewNotification {
        user_id,
        notification_type,
        title,
        message,
        priority,
        related: RelatedEntity::FixedPayment(payment.id),
        payload: NotificationPayload::FixedPaymentDue {
            payment_id: payment.id,
            payment_name: payment.name.clone(),
            amount: payment.amount,
            due_day,
            days_until_due: days,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(name: &str, due_day: Option<i32>, amount: f64) -> FixedPayment {
        FixedPayment {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.into(),
            amount,
            due_day,
            is_active: true,
            last_paid_on: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rent_three_days_ahead() {
        let out = FixedPaymentRule.evaluate(
            Uuid::nil(),
            date(2026, 9, 12),
            &[payment("Rent", Some(15), 5000.0)],
        );
        assert_eq!(out.len(), 1);
        let n = &out[0];
        assert_eq!(n.notification_type, NotificationType::FixedPayment3Day);
        assert_eq!(n.priority, NotificationPriority::Medium);
        assert!(n.message.contains("3 gün sonra"));
        assert!(n.message.contains("5000"));
        assert_eq!(n.message, "Rent ödemesi 3 gün sonra (15 Eylül) - 5000.00 TL");
    }

    #[test]
    fn test_thresholds_only() {
        let today = date(2026, 9, 12);
        let payments = [
            payment("Tomorrow", Some(13), 10.0),
            payment("Today", Some(12), 10.0),
            payment("TwoDays", Some(14), 10.0),
            payment("NoDay", None, 10.0),
            payment("Bogus", Some(40), 10.0),
        ];
        let types: Vec<_> = FixedPaymentRule
            .evaluate(Uuid::nil(), today, &payments)
            .into_iter()
            .map(|n| (n.notification_type, n.priority))
            .collect();
        assert_eq!(
            types,
            vec![
                (NotificationType::FixedPayment1Day, NotificationPriority::High),
                (NotificationType::FixedPaymentToday, NotificationPriority::High),
            ]
        );
    }

    #[test]
    fn test_wrap_names_next_month() {
        let out = FixedPaymentRule.evaluate(
            Uuid::nil(),
            date(2026, 9, 29),
            &[payment("Internet", Some(2), 250.0)],
        );
        assert_eq!(out[0].message, "Internet ödemesi 3 gün sonra (2 Ekim) - 250.00 TL");
    }
}
