//! In-memory repository doubles for driving the router without PostgreSQL
//!
//! Both repositories share one store so that the subject foreign key and
//! the cascading delete behave like the database schema.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use uuid::Uuid;

use fhir_lite::api::{router, AppState};
use fhir_lite::domain::observation::Observation;
use fhir_lite::domain::patient::Patient;
use fhir_lite::domain::repositories::errors::RepositoryResult;
use fhir_lite::domain::repositories::{
    HealthCheck, ObservationRepository, PatientRepository, RepositoryError,
};
use fhir_lite::domain::search::{
    ObservationSearch, Page, PageLimits, PatientSearch, SearchResult,
};

#[derive(Default)]
struct Store {
    patients: Vec<Patient>,
    observations: Vec<Observation>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Store>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.inner.lock().unwrap()
    }

    pub fn patient_count(&self) -> usize {
        self.lock().patients.len()
    }

    pub fn observation_count(&self) -> usize {
        self.lock().observations.len()
    }
}

fn paginate<T: Clone>(matches: Vec<&T>, page: &Page) -> SearchResult<T> {
    SearchResult {
        total: matches.len() as i64,
        items: matches
            .into_iter()
            .skip(page.offset as usize)
            .take(page.count as usize)
            .cloned()
            .collect(),
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.to_lowercase().starts_with(&prefix.to_lowercase())
}

fn patient_matches(patient: &Patient, search: &PatientSearch) -> bool {
    let family_ok = search.family.as_deref().map_or(true, |family| {
        patient.name().iter().any(|n| {
            n.family
                .as_deref()
                .map_or(false, |f| starts_with_ignore_case(f, family))
        })
    });
    let given_ok = search.given.as_deref().map_or(true, |given| {
        patient
            .name()
            .iter()
            .flat_map(|n| n.given.iter())
            .any(|g| starts_with_ignore_case(g, given))
    });
    let gender_ok = search.gender.map_or(true, |g| patient.gender() == Some(g));
    let birthdate_ok = search.birthdate.as_ref().map_or(true, |param| {
        patient
            .birth_date()
            .map_or(false, |date| param.matches_date(date))
    });

    family_ok && given_ok && gender_ok && birthdate_ok
}

fn observation_matches(observation: &Observation, search: &ObservationSearch) -> bool {
    let patient_ok = search
        .patient
        .map_or(true, |id| observation.subject_id() == id);
    let category_ok = search.category.as_ref().map_or(true, |token| {
        observation.category().iter().any(|c| token.matches(c))
    });
    let code_ok = search
        .code
        .as_ref()
        .map_or(true, |token| token.matches(observation.code()));
    let date_ok = search.date.as_ref().map_or(true, |param| {
        observation
            .effective_at()
            .map_or(false, |at| param.matches(at))
    });

    patient_ok && category_ok && code_ok && date_ok
}

pub struct MemoryPatientRepository {
    store: MemoryStore,
}

#[async_trait]
impl PatientRepository for MemoryPatientRepository {
    async fn create(&self, patient: &Patient) -> RepositoryResult<Patient> {
        self.store.lock().patients.push(patient.clone());
        Ok(patient.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Patient>> {
        Ok(self
            .store
            .lock()
            .patients
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn update(&self, patient: &Patient) -> RepositoryResult<Patient> {
        let mut store = self.store.lock();
        let slot = store
            .patients
            .iter_mut()
            .find(|p| p.id() == patient.id())
            .ok_or(RepositoryError::NotFound {
                resource_type: Patient::RESOURCE_TYPE,
                id: patient.id(),
            })?;

        let stored = Patient::from_persistence(
            patient.id(),
            patient.active(),
            patient.gender(),
            patient.birth_date(),
            patient.name().to_vec(),
            patient.telecom().to_vec(),
            patient.address().to_vec(),
            slot.version_id() + 1,
            slot.created_at(),
            Utc::now(),
        );
        *slot = stored.clone();
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut store = self.store.lock();
        let before = store.patients.len();
        store.patients.retain(|p| p.id() != id);
        let deleted = store.patients.len() < before;
        if deleted {
            store.observations.retain(|o| o.subject_id() != id);
        }
        Ok(deleted)
    }

    async fn search(&self, search: &PatientSearch) -> RepositoryResult<SearchResult<Patient>> {
        let store = self.store.lock();
        let matches = store
            .patients
            .iter()
            .filter(|p| patient_matches(p, search))
            .collect();
        Ok(paginate(matches, &search.page))
    }
}

pub struct MemoryObservationRepository {
    store: MemoryStore,
}

#[async_trait]
impl ObservationRepository for MemoryObservationRepository {
    async fn create(&self, observation: &Observation) -> RepositoryResult<Observation> {
        let mut store = self.store.lock();
        if !store
            .patients
            .iter()
            .any(|p| p.id() == observation.subject_id())
        {
            return Err(RepositoryError::InvalidReference(
                observation.subject_reference(),
            ));
        }
        store.observations.push(observation.clone());
        Ok(observation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Observation>> {
        Ok(self
            .store
            .lock()
            .observations
            .iter()
            .find(|o| o.id() == id)
            .cloned())
    }

    async fn update(&self, observation: &Observation) -> RepositoryResult<Observation> {
        let mut store = self.store.lock();
        if !store
            .patients
            .iter()
            .any(|p| p.id() == observation.subject_id())
        {
            return Err(RepositoryError::InvalidReference(
                observation.subject_reference(),
            ));
        }
        let slot = store
            .observations
            .iter_mut()
            .find(|o| o.id() == observation.id())
            .ok_or(RepositoryError::NotFound {
                resource_type: Observation::RESOURCE_TYPE,
                id: observation.id(),
            })?;

        let stored = Observation::from_persistence(
            observation.id(),
            observation.status(),
            observation.category().to_vec(),
            observation.code().clone(),
            observation.subject_id(),
            observation.effective_at(),
            observation.value_quantity().cloned(),
            observation.reference_range().to_vec(),
            slot.version_id() + 1,
            slot.created_at(),
            Utc::now(),
        );
        *slot = stored.clone();
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut store = self.store.lock();
        let before = store.observations.len();
        store.observations.retain(|o| o.id() != id);
        Ok(store.observations.len() < before)
    }

    async fn search(
        &self,
        search: &ObservationSearch,
    ) -> RepositoryResult<SearchResult<Observation>> {
        let store = self.store.lock();
        let matches = store
            .observations
            .iter()
            .filter(|o| observation_matches(o, search))
            .collect();
        Ok(paginate(matches, &search.page))
    }
}

/// Health probe whose answer the test controls
#[derive(Clone)]
pub struct SwitchableHealth {
    healthy: Arc<AtomicBool>,
}

impl SwitchableHealth {
    pub fn set(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthCheck for SwitchableHealth {
    async fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Router plus handles onto its backing doubles
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub health: SwitchableHealth,
}

/// Setup test application backed by in-memory repositories
pub fn setup_app() -> TestApp {
    let store = MemoryStore::default();
    let health = SwitchableHealth {
        healthy: Arc::new(AtomicBool::new(true)),
    };

    let state = AppState {
        patients: Arc::new(MemoryPatientRepository {
            store: store.clone(),
        }),
        observations: Arc::new(MemoryObservationRepository {
            store: store.clone(),
        }),
        health: Arc::new(health.clone()),
        page_limits: PageLimits::default(),
    };

    TestApp {
        router: router(state),
        store,
        health,
    }
}
