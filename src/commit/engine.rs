use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::plan::{ProductCreate, ProductUpdate, VariantCreate, VariantUpdate};
use super::{CommitError, CommitPhase, CommitPlan, CommitReport};
use crate::catalog::{CatalogError, CatalogService};
use crate::entity::{EntityId, NewProduct, NewVariant, TempId};

/// Drives a [`CommitPlan`] against a catalog service.
///
/// Phases run strictly one after another; the calls inside a phase run
/// concurrently and the first failure ends the commit. Nothing already
/// applied is undone.
pub struct CommitEngine<'a, C: ?Sized> {
    catalog: &'a C,
}

impl<'a, C: CatalogService + ?Sized> CommitEngine<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub async fn run(&self, plan: CommitPlan) -> Result<CommitReport, CommitError> {
        let mut report = CommitReport::default();
        if plan.is_empty() {
            debug!("nothing to commit");
            return Ok(report);
        }
        info!(writes = plan.write_count(), "commit started");

        let CommitPlan {
            variant_deletes,
            product_deletes,
            product_creates,
            variant_creates,
            product_updates,
            variant_updates,
        } = plan;

        self.delete(&variant_deletes, &product_deletes, &mut report)
            .await
            .map_err(|source| phase_error(CommitPhase::Delete, source, &report))?;

        let deferred = self
            .create_products(product_creates, &mut report)
            .await
            .map_err(|source| phase_error(CommitPhase::CreateProducts, source, &report))?;

        self.create_variants(variant_creates, &mut report).await?;

        self.update_products(product_updates, &mut report)
            .await
            .map_err(|source| phase_error(CommitPhase::UpdateProducts, source, &report))?;

        self.update_variants(variant_updates, &mut report)
            .await
            .map_err(|source| phase_error(CommitPhase::UpdateVariants, source, &report))?;

        self.resolve_defaults(deferred, &mut report)
            .await
            .map_err(|source| phase_error(CommitPhase::ResolveDefaults, source, &report))?;

        info!(writes = report.write_count(), "commit finished");
        Ok(report)
    }

    /// Phase 1. Variant deletes settle before product deletes go out, so they
    /// never race the server's cascade over the same rows.
    async fn delete(
        &self,
        variant_ids: &[String],
        product_ids: &[String],
        report: &mut CommitReport,
    ) -> Result<(), CatalogError> {
        debug!(
            variants = variant_ids.len(),
            products = product_ids.len(),
            "phase {}",
            CommitPhase::Delete
        );
        let catalog = self.catalog;

        try_join_all(variant_ids.iter().map(|id| catalog.delete_variant(id))).await?;
        report.variants_deleted = variant_ids.len();

        try_join_all(product_ids.iter().map(|id| catalog.delete_product(id))).await?;
        report.products_deleted = product_ids.len();
        Ok(())
    }

    /// Phase 2. Returns the `(product, temporary default)` pairs that phase 6
    /// still has to settle.
    async fn create_products(
        &self,
        creates: Vec<ProductCreate>,
        report: &mut CommitReport,
    ) -> Result<Vec<(String, TempId)>, CatalogError> {
        debug!(count = creates.len(), "phase {}", CommitPhase::CreateProducts);
        let catalog = self.catalog;

        let created = try_join_all(creates.into_iter().map(|create| async move {
            let product = catalog.create_product(create.payload).await?;
            Ok::<_, CatalogError>((create.temp, product.product_id, create.deferred_default))
        }))
        .await?;

        let mut deferred = Vec::new();
        for (temp, real, default) in created {
            debug!(temp = %temp, real = %real, "product created");
            if let Some(variant) = default {
                deferred.push((real.clone(), variant));
            }
            report.ids.insert_product(temp, real);
            report.products_created += 1;
        }
        Ok(deferred)
    }

    /// Phase 3. Every parent must resolve before the first call goes out.
    async fn create_variants(
        &self,
        creates: Vec<VariantCreate>,
        report: &mut CommitReport,
    ) -> Result<(), CommitError> {
        debug!(count = creates.len(), "phase {}", CommitPhase::CreateVariants);

        let mut payloads = Vec::with_capacity(creates.len());
        for create in creates {
            let Some(product_id) = report.ids.resolve_product(&create.product_id) else {
                return Err(CommitError::UnresolvedParent {
                    variant: create.temp,
                    product: create.product_id,
                    report: report.clone(),
                });
            };
            let related = resolve_related(&create.related_products, report);
            payloads.push((create.temp, create.payload(product_id, related)));
        }

        let catalog = self.catalog;
        let created = try_join_all(payloads.into_iter().map(|(temp, payload)| async move {
            let variant = catalog.create_variant(payload).await?;
            Ok::<_, CatalogError>((temp, variant.variant_id))
        }))
        .await
        .map_err(|source| phase_error(CommitPhase::CreateVariants, source, report))?;

        for (temp, real) in created {
            debug!(temp = %temp, real = %real, "variant created");
            report.ids.insert_variant(temp, real);
            report.variants_created += 1;
        }
        Ok(())
    }

    /// Phase 4. A buffered default of `None` is sent as an explicit clear.
    /// Temporary defaults resolve through the phase 3 map or are left out of
    /// the payload.
    async fn update_products(
        &self,
        updates: Vec<ProductUpdate>,
        report: &mut CommitReport,
    ) -> Result<(), CatalogError> {
        debug!(count = updates.len(), "phase {}", CommitPhase::UpdateProducts);

        let mut payloads = Vec::with_capacity(updates.len());
        for update in updates {
            let default_variant_id = match &update.default_variant_id {
                Some(id) => match report.ids.resolve_variant(id) {
                    Some(real) => Some(Some(real)),
                    None => {
                        warn!(product = %update.product_id, variant = %id, "dropping unresolved default variant");
                        None
                    }
                },
                None => Some(None),
            };
            payloads.push((update.product_id, update.data, default_variant_id));
        }

        let catalog = self.catalog;
        let count = payloads.len();
        try_join_all(
            payloads
                .into_iter()
                .map(|(product_id, data, default_variant_id)| async move {
                    let payload = NewProduct {
                        data,
                        default_variant_id,
                    };
                    catalog.update_product(&product_id, payload).await
                }),
        )
        .await?;
        report.products_updated = count;
        Ok(())
    }

    /// Phase 5.
    async fn update_variants(
        &self,
        updates: Vec<VariantUpdate>,
        report: &mut CommitReport,
    ) -> Result<(), CatalogError> {
        debug!(count = updates.len(), "phase {}", CommitPhase::UpdateVariants);

        let payloads: Vec<_> = updates
            .into_iter()
            .map(|update| {
                let related = resolve_related(&update.related_products, report);
                let payload = NewVariant {
                    product_id: update.product_id,
                    data: update.data,
                    related_product_ids: related,
                };
                (update.variant_id, payload)
            })
            .collect();

        let catalog = self.catalog;
        let count = payloads.len();
        try_join_all(
            payloads
                .into_iter()
                .map(|(variant_id, payload)| async move {
                    catalog.update_variant(&variant_id, payload).await
                }),
        )
        .await?;
        report.variants_updated = count;
        Ok(())
    }

    /// Phase 6. Point freshly created products at their freshly created
    /// default variants.
    async fn resolve_defaults(
        &self,
        deferred: Vec<(String, TempId)>,
        report: &mut CommitReport,
    ) -> Result<(), CatalogError> {
        debug!(count = deferred.len(), "phase {}", CommitPhase::ResolveDefaults);

        let mut pairs = Vec::with_capacity(deferred.len());
        for (product_id, temp) in deferred {
            match report.ids.variant(temp) {
                Some(real) => pairs.push((product_id, real.to_string())),
                None => warn!(product = %product_id, variant = %temp, "default variant was never created"),
            }
        }

        let catalog = self.catalog;
        let count = pairs.len();
        try_join_all(pairs.into_iter().map(|(product_id, variant_id)| async move {
            catalog.update_default_variant(&product_id, &variant_id).await
        }))
        .await?;
        report.defaults_resolved = count;
        Ok(())
    }
}

/// Related products that are still temporary resolve through the phase 2 map;
/// ones that never got created are dropped.
fn resolve_related(ids: &[EntityId], report: &CommitReport) -> Vec<String> {
    ids.iter()
        .filter_map(|id| report.ids.resolve_product(id))
        .collect()
}

fn phase_error(phase: CommitPhase, source: CatalogError, report: &CommitReport) -> CommitError {
    warn!(%phase, error = %source, "commit phase failed");
    CommitError::Phase {
        phase,
        source,
        report: report.clone(),
    }
}
