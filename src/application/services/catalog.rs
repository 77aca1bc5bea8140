//! Catalog service: brands, vehicle types and models
//!
//! Enforces name rules and brand references, and implements the
//! find-or-create protocol used for free-text catalog input.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::{require_enabled, validate_year};
use crate::config::FleetSettings;
use crate::domain::catalog::CatalogRepository;
use crate::domain::{
    Brand, CatalogEntry, CatalogKind, CatalogRecord, DomainError, DomainResult,
    RepositoryProvider, VehicleModel, VehicleType,
};
use crate::shared::validations::{optional_text, require_text};
use crate::shared::with_deadline;

pub struct CatalogService {
    repos: Arc<dyn RepositoryProvider>,
    settings: FleetSettings,
}

impl CatalogService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: FleetSettings) -> Self {
        Self { repos, settings }
    }

    // ── Creation ────────────────────────────────────────────────

    pub async fn create_brand(&self, name: &str, description: Option<String>) -> DomainResult<Brand> {
        let name = require_text("name", name)?;
        let brand = Brand::new(name, optional_text(description));
        let created = self.store("brands.create", self.repos.brands().create(brand)).await?;
        info!(brand_id = %created.id, name = %created.name, "Brand created");
        Ok(created)
    }

    pub async fn create_type(&self, name: &str, description: &str) -> DomainResult<VehicleType> {
        let name = require_text("name", name)?;
        let description = require_text("description", description)?;
        let vehicle_type = VehicleType::new(name, description);
        let created = self
            .store("vehicle_types.create", self.repos.vehicle_types().create(vehicle_type))
            .await?;
        info!(type_id = %created.id, name = %created.name, "Vehicle type created");
        Ok(created)
    }

    pub async fn create_model(
        &self,
        name: &str,
        brand_id: Uuid,
        type_id: Option<Uuid>,
        year: Option<i32>,
    ) -> DomainResult<VehicleModel> {
        let name = require_text("name", name)?;
        if let Some(year) = year {
            validate_year(&self.settings, year)?;
        }
        self.require_brand(brand_id).await?;
        if let Some(type_id) = type_id {
            require_enabled::<VehicleType, _>(self.repos.vehicle_types(), type_id, &self.settings).await?;
        }

        let mut model = VehicleModel::new(name, brand_id);
        model.type_id = type_id;
        model.year = year;
        let created = self.store("models.create", self.repos.models().create(model)).await?;
        info!(model_id = %created.id, brand_id = %brand_id, name = %created.name, "Model created");
        Ok(created)
    }

    // ── Find-or-create ──────────────────────────────────────────

    /// Resolve free text to a catalog entry, creating it when absent.
    ///
    /// `brand_id` is required for models, whose names are scoped by brand.
    pub async fn find_or_create(
        &self,
        kind: CatalogKind,
        name: &str,
        brand_id: Option<Uuid>,
    ) -> DomainResult<CatalogEntry> {
        match kind {
            CatalogKind::Brand => self.find_or_create_brand(name).await.map(Into::into),
            CatalogKind::VehicleType => self.find_or_create_type(name).await.map(Into::into),
            CatalogKind::Model => {
                let brand_id = brand_id
                    .ok_or_else(|| DomainError::validation("brand_id", "is required for models"))?;
                self.find_or_create_model(brand_id, name).await.map(Into::into)
            }
        }
    }

    pub async fn find_or_create_brand(&self, name: &str) -> DomainResult<Brand> {
        let name = require_text("name", name)?;
        self.resolve_or_create(self.repos.brands(), Brand::new(name, None))
            .await
    }

    /// A type created this way uses its name as description.
    pub async fn find_or_create_type(&self, name: &str) -> DomainResult<VehicleType> {
        let name = require_text("name", name)?;
        let candidate = VehicleType::new(name.clone(), name);
        self.resolve_or_create(self.repos.vehicle_types(), candidate)
            .await
    }

    pub async fn find_or_create_model(&self, brand_id: Uuid, name: &str) -> DomainResult<VehicleModel> {
        let name = require_text("name", name)?;
        let models = self.repos.models();
        if let Some(existing) = self
            .store("models.find_by_name", models.find_by_name(Some(brand_id), &name))
            .await?
        {
            return Ok(existing);
        }
        self.require_brand(brand_id).await?;
        self.resolve_or_create(models, VehicleModel::new(name, brand_id))
            .await
    }

    /// Look up by name, create on miss. A creation that loses a race to a
    /// concurrent caller returns the winner's entry.
    async fn resolve_or_create<E, R>(&self, repo: &R, candidate: E) -> DomainResult<E>
    where
        E: CatalogRecord,
        R: CatalogRepository<E> + ?Sized,
    {
        let scope = candidate.name_scope();
        let name = candidate.name().to_string();

        if let Some(existing) = self
            .store("catalog.find_by_name", repo.find_by_name(scope, &name))
            .await?
        {
            return Ok(existing);
        }

        match self.store("catalog.create", repo.create(candidate)).await {
            Ok(created) => {
                info!(kind = %E::KIND, id = %created.id(), name = %name, "Catalog entry created by name");
                Ok(created)
            }
            Err(DomainError::AlreadyExists { .. }) => {
                debug!(kind = %E::KIND, name = %name, "Lost find-or-create race, using existing entry");
                self.store("catalog.find_by_name", repo.find_by_name(scope, &name))
                    .await?
                    .ok_or_else(|| DomainError::Conflict {
                        entity: E::KIND.entity_name(),
                        key: name,
                    })
            }
            Err(e) => Err(e),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Soft-delete. Existing vehicle references are left untouched.
    pub async fn disable(&self, kind: CatalogKind, id: Uuid) -> DomainResult<CatalogEntry> {
        self.set_enabled(kind, id, false).await
    }

    pub async fn enable(&self, kind: CatalogKind, id: Uuid) -> DomainResult<CatalogEntry> {
        self.set_enabled(kind, id, true).await
    }

    async fn set_enabled(&self, kind: CatalogKind, id: Uuid, enabled: bool) -> DomainResult<CatalogEntry> {
        let entry = match kind {
            CatalogKind::Brand => self.toggle::<Brand, _>(self.repos.brands(), id, enabled).await?.into(),
            CatalogKind::VehicleType => self.toggle::<VehicleType, _>(self.repos.vehicle_types(), id, enabled).await?.into(),
            CatalogKind::Model => self.toggle::<VehicleModel, _>(self.repos.models(), id, enabled).await?.into(),
        };
        info!(%kind, %id, enabled, "Catalog entry availability changed");
        Ok(entry)
    }

    async fn toggle<E, R>(&self, repo: &R, id: Uuid, enabled: bool) -> DomainResult<E>
    where
        E: CatalogRecord,
        R: CatalogRepository<E> + ?Sized,
    {
        let mut entry = self.load(repo, id).await?;
        if entry.is_enabled() == enabled {
            return Ok(entry);
        }
        entry.set_enabled(enabled);
        entry.touch();
        self.store("catalog.update", repo.update(entry)).await
    }

    /// Rename an entry, keeping names unique in their scope.
    pub async fn rename(&self, kind: CatalogKind, id: Uuid, name: &str) -> DomainResult<CatalogEntry> {
        let name = require_text("name", name)?;
        match kind {
            CatalogKind::Brand => self.rename_in::<Brand, _>(self.repos.brands(), id, name).await.map(Into::into),
            CatalogKind::VehicleType => self.rename_in::<VehicleType, _>(self.repos.vehicle_types(), id, name).await.map(Into::into),
            CatalogKind::Model => self.rename_in::<VehicleModel, _>(self.repos.models(), id, name).await.map(Into::into),
        }
    }

    async fn rename_in<E, R>(&self, repo: &R, id: Uuid, name: String) -> DomainResult<E>
    where
        E: CatalogRecord,
        R: CatalogRepository<E> + ?Sized,
    {
        let mut entry = self.load(repo, id).await?;
        entry.rename(name);
        entry.touch();
        self.store("catalog.update", repo.update(entry)).await
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, kind: CatalogKind, id: Uuid) -> DomainResult<CatalogEntry> {
        Ok(match kind {
            CatalogKind::Brand => self.load::<Brand, _>(self.repos.brands(), id).await?.into(),
            CatalogKind::VehicleType => self.load::<VehicleType, _>(self.repos.vehicle_types(), id).await?.into(),
            CatalogKind::Model => self.load::<VehicleModel, _>(self.repos.models(), id).await?.into(),
        })
    }

    /// Enabled entries of one kind, ordered by name
    pub async fn list_enabled(&self, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>> {
        let entries: Vec<CatalogEntry> = match kind {
            CatalogKind::Brand => self
                .store("brands.find_all", self.repos.brands().find_all())
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            CatalogKind::VehicleType => self
                .store("vehicle_types.find_all", self.repos.vehicle_types().find_all())
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            CatalogKind::Model => self
                .store("models.find_all", self.repos.models().find_all())
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        };
        Ok(entries.into_iter().filter(|e| e.is_enabled()).collect())
    }

    /// Every model of a brand, enabled or not
    pub async fn models_by_brand(&self, brand_id: Uuid) -> DomainResult<Vec<VehicleModel>> {
        self.store("models.find_by_brand", self.repos.models().find_by_brand(brand_id))
            .await
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn require_brand(&self, brand_id: Uuid) -> DomainResult<Brand> {
        require_enabled(self.repos.brands(), brand_id, &self.settings).await
    }

    async fn load<E, R>(&self, repo: &R, id: Uuid) -> DomainResult<E>
    where
        E: CatalogRecord,
        R: CatalogRepository<E> + ?Sized,
    {
        self.store("catalog.find_by_id", repo.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found(E::KIND.entity_name(), id))
    }

    async fn store<T>(
        &self,
        operation: &'static str,
        call: impl std::future::Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        with_deadline(self.settings.store_timeout, operation, call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn service() -> CatalogService {
        CatalogService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            FleetSettings::default(),
        )
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let svc = service();
        assert!(matches!(
            svc.create_brand("  ", None).await,
            Err(DomainError::Validation { field: "name", .. })
        ));
        assert!(matches!(
            svc.create_type("Van", " ").await,
            Err(DomainError::Validation { field: "description", .. })
        ));
    }

    #[tokio::test]
    async fn brand_names_are_unique_case_insensitively() {
        let svc = service();
        svc.create_brand("Toyota", None).await.unwrap();
        assert!(matches!(
            svc.create_brand("TOYOTA", None).await,
            Err(DomainError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn model_requires_existing_enabled_brand() {
        let svc = service();
        let missing = svc.create_model("Corolla", Uuid::new_v4(), None, None).await;
        assert!(matches!(missing, Err(DomainError::ReferentialIntegrity { .. })));

        let brand = svc.create_brand("Toyota", None).await.unwrap();
        svc.disable(CatalogKind::Brand, brand.id).await.unwrap();
        let disabled = svc.create_model("Corolla", brand.id, None, None).await;
        assert!(matches!(disabled, Err(DomainError::ReferentialIntegrity { .. })));

        svc.enable(CatalogKind::Brand, brand.id).await.unwrap();
        let model = svc.create_model("Corolla", brand.id, None, Some(2020)).await.unwrap();
        assert_eq!(model.brand_id, brand.id);
    }

    #[tokio::test]
    async fn model_year_is_range_checked() {
        let svc = service();
        let brand = svc.create_brand("Seat", None).await.unwrap();
        let err = svc.create_model("Ibiza", brand.id, None, Some(1850)).await;
        assert!(matches!(err, Err(DomainError::Validation { field: "year", .. })));
    }

    #[tokio::test]
    async fn find_or_create_returns_existing_entry() {
        let svc = service();
        let created = svc.create_brand("Renault", None).await.unwrap();
        let found = svc.find_or_create(CatalogKind::Brand, " renault ", None).await.unwrap();
        assert_eq!(found.id(), created.id);
        assert_eq!(svc.list_enabled(CatalogKind::Brand).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_or_create_type_uses_name_as_description() {
        let svc = service();
        let van = svc.find_or_create_type("Van").await.unwrap();
        assert_eq!(van.description, "Van");
    }

    #[tokio::test]
    async fn find_or_create_model_needs_brand() {
        let svc = service();
        let err = svc.find_or_create(CatalogKind::Model, "Clio", None).await;
        assert!(matches!(err, Err(DomainError::Validation { field: "brand_id", .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_find_or_create_converges_on_one_brand() {
        let svc = Arc::new(service());
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move { svc.find_or_create_brand("Toyota").await }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            let brand = task.await.unwrap().unwrap();
            assert_eq!(brand.name, "Toyota");
            ids.push(brand.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(svc.list_enabled(CatalogKind::Brand).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn disabled_entries_leave_enabled_list_but_not_brand_index() {
        let svc = service();
        let brand = svc.create_brand("Ford", None).await.unwrap();
        let transit = svc.create_model("Transit", brand.id, None, None).await.unwrap();
        svc.create_model("Focus", brand.id, None, None).await.unwrap();

        let disabled = svc.disable(CatalogKind::Model, transit.id).await.unwrap();
        assert!(!disabled.is_enabled());

        assert_eq!(svc.list_enabled(CatalogKind::Model).await.unwrap().len(), 1);
        assert_eq!(svc.models_by_brand(brand.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rename_keeps_names_unique() {
        let svc = service();
        let a = svc.create_brand("Iveco", None).await.unwrap();
        svc.create_brand("Man", None).await.unwrap();
        assert!(matches!(
            svc.rename(CatalogKind::Brand, a.id, "MAN").await,
            Err(DomainError::AlreadyExists { .. })
        ));
        let renamed = svc.rename(CatalogKind::Brand, a.id, "Iveco Trucks").await.unwrap();
        assert_eq!(renamed.name(), "Iveco Trucks");
    }

    #[tokio::test]
    async fn get_unknown_entry_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.get(CatalogKind::VehicleType, Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
