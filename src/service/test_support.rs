// service/test_support.rs
//
// In-memory record store and scripted payment processor used by the
// service tests. The store mimics the compare-and-set semantics of the SQL
// layer and keeps read/write logs so tests can assert what was touched.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Error;
use uuid::Uuid;

use crate::db::connectdb::ConnectAccountExt;
use crate::db::jobdb::JobExt;
use crate::db::paymentdb::EscrowPaymentExt;
use crate::models::jobmodel::{Job, JobStatus};
use crate::models::paymentmodel::{ConnectAccount, EscrowPayment, PaymentStatus};
use crate::service::payment_processor::{
    HeldPayment, HeldPaymentRequest, PaymentProcessor, ProcessorError, ProcessorRefund,
};
use crate::utils::currency::platform_fee_cents;

#[derive(Default)]
pub struct MemoryStore {
    pub jobs: Mutex<HashMap<Uuid, Job>>,
    pub payments: Mutex<HashMap<Uuid, EscrowPayment>>,
    pub accounts: Mutex<HashMap<Uuid, ConnectAccount>>, // keyed by user id
    pub reads: Mutex<Vec<String>>,
    pub writes: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Insert a job directly, bypassing the logs.
    pub fn seed_job(&self, tradie_id: Uuid, helper_id: Option<Uuid>, status: JobStatus) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            tradie_id,
            assigned_helper_id: helper_id,
            title: "Fix the back fence".to_string(),
            description: "Two palings down after the storm".to_string(),
            status,
            location_suburb: Some("Marrickville".to_string()),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        job
    }

    pub fn seed_payment(&self, job: &Job, amount: i64, status: PaymentStatus) -> EscrowPayment {
        let now = Utc::now();
        let payment = EscrowPayment {
            id: Uuid::new_v4(),
            job_id: job.id,
            tradie_id: job.tradie_id,
            helper_id: job.assigned_helper_id.unwrap_or_else(Uuid::new_v4),
            amount,
            platform_fee_amount: platform_fee_cents(amount, 500),
            currency: "aud".to_string(),
            external_payment_ref: format!("pi_{}", Uuid::new_v4().as_simple()),
            status,
            created_at: Some(now),
            paid_at: match status {
                PaymentStatus::Pending | PaymentStatus::Failed => None,
                _ => Some(now),
            },
            completed_at: match status {
                PaymentStatus::Completed => Some(now),
                _ => None,
            },
            refunded_at: match status {
                PaymentStatus::Refunded => Some(now),
                _ => None,
            },
            updated_at: Some(now),
        };
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id, payment.clone());
        payment
    }

    pub fn seed_connect_account(&self, user_id: Uuid, payouts_enabled: bool) -> ConnectAccount {
        let account = ConnectAccount {
            id: Uuid::new_v4(),
            user_id,
            external_account_id: format!("acct_{}", Uuid::new_v4().as_simple()),
            charges_enabled: payouts_enabled,
            payouts_enabled,
            details_submitted: payouts_enabled,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(user_id, account.clone());
        account
    }

    fn log_read(&self, entry: impl Into<String>) {
        self.reads.lock().unwrap().push(entry.into());
    }

    fn log_write(&self, entry: impl Into<String>) {
        self.writes.lock().unwrap().push(entry.into());
    }
}

#[async_trait]
impl JobExt for MemoryStore {
    async fn create_job(
        &self,
        tradie_id: Uuid,
        title: String,
        description: String,
        location_suburb: Option<String>,
    ) -> Result<Job, Error> {
        let job = Job {
            id: Uuid::new_v4(),
            tradie_id,
            assigned_helper_id: None,
            title,
            description,
            status: JobStatus::Open,
            location_suburb,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        self.log_write(format!("create_job:{}", job.id));
        Ok(job)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        self.log_read(format!("get_job:{}", job_id));
        Ok(self.jobs.lock().unwrap().get(&job_id).cloned())
    }

    async fn assign_helper(&self, job_id: Uuid, helper_id: Uuid) -> Result<Option<Job>, Error> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Open => {
                job.assigned_helper_id = Some(helper_id);
                job.status = JobStatus::Assigned;
                job.updated_at = Some(Utc::now());
                self.log_write(format!("assign_helper:{}", job_id));
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn transition_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, Error> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&job_id) {
            Some(job) if job.status == from => {
                job.status = to;
                job.updated_at = Some(Utc::now());
                self.log_write(format!("transition_job_status:{}", job_id));
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl EscrowPaymentExt for MemoryStore {
    async fn create_escrow_payment(
        &self,
        job_id: Uuid,
        tradie_id: Uuid,
        helper_id: Uuid,
        amount: i64,
        platform_fee_amount: i64,
        currency: String,
        external_payment_ref: String,
    ) -> Result<EscrowPayment, Error> {
        let payment = EscrowPayment {
            id: Uuid::new_v4(),
            job_id,
            tradie_id,
            helper_id,
            amount,
            platform_fee_amount,
            currency,
            external_payment_ref,
            status: PaymentStatus::Pending,
            created_at: Some(Utc::now()),
            paid_at: None,
            completed_at: None,
            refunded_at: None,
            updated_at: Some(Utc::now()),
        };
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id, payment.clone());
        self.log_write(format!("create_escrow_payment:{}", payment.id));
        Ok(payment)
    }

    async fn get_escrow_payment(&self, payment_id: Uuid) -> Result<Option<EscrowPayment>, Error> {
        self.log_read(format!("get_escrow_payment:{}", payment_id));
        Ok(self.payments.lock().unwrap().get(&payment_id).cloned())
    }

    async fn get_payment_by_external_ref(
        &self,
        external_payment_ref: &str,
    ) -> Result<Option<EscrowPayment>, Error> {
        self.log_read(format!("get_payment_by_external_ref:{}", external_payment_ref));
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .find(|payment| payment.external_payment_ref == external_payment_ref)
            .cloned())
    }

    async fn get_active_payment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<EscrowPayment>, Error> {
        self.log_read(format!("get_active_payment_for_job:{}", job_id));
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .find(|payment| payment.job_id == job_id && payment.status.is_active())
            .cloned())
    }

    async fn transition_payment_status(
        &self,
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<EscrowPayment>, Error> {
        let mut payments = self.payments.lock().unwrap();
        match payments.get_mut(&payment_id) {
            Some(payment) if payment.status == from => {
                let now = Utc::now();
                payment.status = to;
                match to {
                    PaymentStatus::Held => payment.paid_at = Some(now),
                    PaymentStatus::Completed => payment.completed_at = Some(now),
                    PaymentStatus::Refunded => payment.refunded_at = Some(now),
                    _ => {}
                }
                payment.updated_at = Some(now);
                self.log_write(format!("transition_payment_status:{}", payment_id));
                Ok(Some(payment.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ConnectAccountExt for MemoryStore {
    async fn create_connect_account(
        &self,
        user_id: Uuid,
        external_account_id: String,
    ) -> Result<ConnectAccount, Error> {
        let account = ConnectAccount {
            id: Uuid::new_v4(),
            user_id,
            external_account_id,
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(user_id, account.clone());
        self.log_write(format!("create_connect_account:{}", user_id));
        Ok(account)
    }

    async fn get_connect_account(&self, user_id: Uuid) -> Result<Option<ConnectAccount>, Error> {
        self.log_read(format!("get_connect_account:{}", user_id));
        Ok(self.accounts.lock().unwrap().get(&user_id).cloned())
    }

    async fn update_connect_account_flags(
        &self,
        user_id: Uuid,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    ) -> Result<Option<ConnectAccount>, Error> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&user_id) {
            Some(account) => {
                account.charges_enabled = charges_enabled;
                account.payouts_enabled = payouts_enabled;
                account.details_submitted = details_submitted;
                account.updated_at = Some(Utc::now());
                self.log_write(format!("update_connect_account_flags:{}", user_id));
                Ok(Some(account.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct FakeProcessor {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_held_payment(
        &self,
        request: &HeldPaymentRequest,
    ) -> Result<HeldPayment, ProcessorError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create_held_payment:{}", request.job_id));
        Ok(HeldPayment {
            reference: format!("pi_{}", request.payment_reference),
            client_secret: format!("pi_{}_secret", request.payment_reference),
        })
    }

    async fn capture_held_payment(&self, reference: &str) -> Result<(), ProcessorError> {
        self.calls.lock().unwrap().push(format!("capture:{}", reference));
        Ok(())
    }

    async fn refund_payment(
        &self,
        reference: &str,
        _reason: Option<&str>,
    ) -> Result<ProcessorRefund, ProcessorError> {
        self.calls.lock().unwrap().push(format!("refund:{}", reference));
        Ok(ProcessorRefund {
            refund_id: format!("re_{}", Uuid::new_v4().as_simple()),
        })
    }

    async fn create_payout_account(
        &self,
        _country: &str,
        user_id: Uuid,
    ) -> Result<String, ProcessorError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create_payout_account:{}", user_id));
        Ok(format!("acct_{}", user_id.as_simple()))
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        _return_url: &str,
        _refresh_url: &str,
    ) -> Result<String, ProcessorError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create_onboarding_link:{}", account_id));
        Ok(format!("https://connect.processor.test/{}/onboarding", account_id))
    }
}
