// service/state_bridge.rs
//
// Single home of the shared state-machine contract between a job's
// lifecycle and its escrow payment's lifecycle. Both the orchestrator and
// the webhook reconciler consult this module instead of encoding the policy
// at their call sites.

use crate::models::jobmodel::JobStatus;
use crate::models::paymentmodel::PaymentStatus;

/// Allowed payment status edges. Everything not listed is invalid and must
/// be treated as a no-op by callers, never an unconditional write.
pub fn is_valid_payment_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
    match (from, to) {
        (PaymentStatus::Pending, PaymentStatus::Held) => true,
        (PaymentStatus::Pending, PaymentStatus::Failed) => true,
        (PaymentStatus::Pending, PaymentStatus::Refunded) => true,
        (PaymentStatus::Held, PaymentStatus::Completed) => true,
        (PaymentStatus::Held, PaymentStatus::Refunded) => true,
        _ => false,
    }
}

/// Job status to apply when the job's payment reaches `held`. Only an
/// `assigned` job moves to `paid`; a stale or duplicate event must not
/// drive an already-progressed job backward.
pub fn job_status_on_payment_held(current: JobStatus) -> Option<JobStatus> {
    match current {
        JobStatus::Assigned => Some(JobStatus::Paid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_hold_fail_or_refund() {
        assert!(is_valid_payment_transition(
            PaymentStatus::Pending,
            PaymentStatus::Held
        ));
        assert!(is_valid_payment_transition(
            PaymentStatus::Pending,
            PaymentStatus::Failed
        ));
        assert!(is_valid_payment_transition(
            PaymentStatus::Pending,
            PaymentStatus::Refunded
        ));
    }

    #[test]
    fn held_can_complete_or_refund() {
        assert!(is_valid_payment_transition(
            PaymentStatus::Held,
            PaymentStatus::Completed
        ));
        assert!(is_valid_payment_transition(
            PaymentStatus::Held,
            PaymentStatus::Refunded
        ));
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for terminal in [
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            for target in [
                PaymentStatus::Pending,
                PaymentStatus::Held,
                PaymentStatus::Completed,
                PaymentStatus::Failed,
                PaymentStatus::Refunded,
            ] {
                assert!(
                    !is_valid_payment_transition(terminal, target),
                    "{:?} -> {:?} should be invalid",
                    terminal,
                    target
                );
            }
        }
    }

    #[test]
    fn pending_cannot_complete_directly() {
        assert!(!is_valid_payment_transition(
            PaymentStatus::Pending,
            PaymentStatus::Completed
        ));
    }

    #[test]
    fn only_assigned_jobs_move_to_paid() {
        assert_eq!(
            job_status_on_payment_held(JobStatus::Assigned),
            Some(JobStatus::Paid)
        );
        assert_eq!(job_status_on_payment_held(JobStatus::Open), None);
        assert_eq!(job_status_on_payment_held(JobStatus::Paid), None);
        assert_eq!(job_status_on_payment_held(JobStatus::Completed), None);
        assert_eq!(job_status_on_payment_held(JobStatus::Cancelled), None);
    }
}
