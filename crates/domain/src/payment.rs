//! Payment method use cases.

use common::{NewPayment, Pagination, Payment, PaymentId, PaymentUpdate};
use store::{Cache, PaymentRepository, keys};

use crate::cached::CacheAside;
use crate::error::{DomainError, Result};
use crate::patch;

const ENTITY: &str = "payment";
const COLLECTION: &str = "payments";

/// Service for managing payment methods.
pub struct PaymentService<R, C> {
    repo: R,
    cache: CacheAside<C>,
}

impl<R: PaymentRepository, C: Cache> PaymentService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self {
            repo,
            cache: CacheAside::new(cache),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        let payment = self.repo.create_payment(payment).await?;

        self.cache
            .write(&keys::entity(ENTITY, payment.id), &payment)
            .await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(payment)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        let key = keys::entity(ENTITY, id);
        if let Some(payment) = self.cache.read(&key).await? {
            return Ok(payment);
        }

        let payment = self.repo.get_payment_by_id(id).await?;
        self.cache.write(&key, &payment).await?;
        Ok(payment)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_payments(&self, page: Pagination) -> Result<Vec<Payment>> {
        let key = keys::list(COLLECTION, &page.cache_params());
        if let Some(payments) = self.cache.read(&key).await? {
            return Ok(payments);
        }

        let payments = self.repo.list_payments(page).await?;
        self.cache.write(&key, &payments).await?;
        Ok(payments)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_payment(&self, id: PaymentId, update: PaymentUpdate) -> Result<Payment> {
        let mut payment = self.repo.get_payment_by_id(id).await?;

        let mut changed = patch::apply_text(&mut payment.name, update.name);
        changed |= patch::apply(&mut payment.payment_type, update.payment_type);
        changed |= patch::apply_text(&mut payment.logo, update.logo);
        if !changed {
            return Err(DomainError::NoUpdatedData);
        }

        let payment = self.repo.update_payment(&payment).await?;

        self.cache
            .write(&keys::entity(ENTITY, id), &payment)
            .await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(payment)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_payment(&self, id: PaymentId) -> Result<()> {
        self.repo.get_payment_by_id(id).await?;

        self.cache.remove(&keys::entity(ENTITY, id)).await?;
        self.cache.invalidate(COLLECTION).await?;

        self.repo.delete_payment(id).await?;
        Ok(())
    }
}
