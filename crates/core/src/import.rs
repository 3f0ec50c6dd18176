//! Synthea FHIR bundle import.
//!
//! A bundle is imported in dependency order (organizations, practitioners, patients, encounters,
//! conditions, observations) through the same services the REST API uses, so every row passes
//! the usual validation and foreign-key checks. Bundle-local references are resolved through
//! per-bundle maps from FHIR id to database id.
//!
//! Organizations, practitioners and patients whose identifier already exists are reused rather
//! than duplicated, which makes re-running an import over the same files safe for those tables.

use crate::constants::BLOOD_PRESSURE_PANEL_CODE;
use crate::models::timestamp::parse_timestamp;
use crate::models::{
    NewCondition, NewEncounter, NewObservation, NewOrganization, NewPatient, NewPractitioner,
};
use crate::repositories::Services;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use fhir::datatypes::{extension_text, first_identifier, primary_name, telecom_value};
use fhir::{Bundle, BundleEntry, Reference, ReferenceTarget, Resource};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Counts of rows touched by an import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub bundles: usize,
    pub organizations: usize,
    pub practitioners: usize,
    pub patients: usize,
    pub encounters: usize,
    pub conditions: usize,
    pub observations: usize,
    /// Existing rows matched by identifier instead of inserted.
    pub reused: usize,
    /// Resources dropped for missing required data or unresolved references.
    pub skipped: usize,
}

impl ImportSummary {
    pub fn absorb(&mut self, other: &ImportSummary) {
        self.bundles += other.bundles;
        self.organizations += other.organizations;
        self.practitioners += other.practitioners;
        self.patients += other.patients;
        self.encounters += other.encounters;
        self.conditions += other.conditions;
        self.observations += other.observations;
        self.reused += other.reused;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bundles={} organizations={} practitioners={} patients={} encounters={} \
             conditions={} observations={} reused={} skipped={}",
            self.bundles,
            self.organizations,
            self.practitioners,
            self.patients,
            self.encounters,
            self.conditions,
            self.observations,
            self.reused,
            self.skipped
        )
    }
}

/// FHIR id to database id, per resource type, for one bundle.
#[derive(Default)]
struct IdMaps {
    organizations: HashMap<String, i64>,
    practitioners: HashMap<String, i64>,
    patients: HashMap<String, i64>,
    encounters: HashMap<String, i64>,
}

fn remember(map: &mut HashMap<String, i64>, entry: &BundleEntry, fhir_id: Option<&str>, id: i64) {
    if let Some(local) = entry.local_id() {
        map.insert(local.to_string(), id);
    }
    if let Some(fhir_id) = fhir_id {
        map.insert(fhir_id.to_string(), id);
    }
}

fn local_ref(map: &HashMap<String, i64>, reference: Option<&Reference>) -> Option<i64> {
    match reference?.target()? {
        ReferenceTarget::Id(id) => map.get(&id).copied(),
        ReferenceTarget::Identifier { value, .. } => map.get(&value).copied(),
    }
}

fn reference_key(reference: Option<&Reference>) -> Option<String> {
    match reference?.target()? {
        ReferenceTarget::Id(id) => Some(id),
        ReferenceTarget::Identifier { value, .. } => Some(value),
    }
}

fn timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|r| parse_timestamp(r).ok())
}

fn owned(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Imports FHIR bundles through the entity services.
#[derive(Clone, Debug)]
pub struct Importer {
    services: Services,
}

impl Importer {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Import one bundle file, or every `*.json` file directly inside a directory.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::FileRead` if the path cannot be read, `CoreError::Fhir` if a file is
    /// not a bundle, or a database error.
    pub async fn import_path(&self, path: &Path) -> CoreResult<ImportSummary> {
        let metadata = fs::metadata(path).await.map_err(CoreError::FileRead)?;
        if !metadata.is_dir() {
            return self.import_file(path).await;
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(path).await.map_err(CoreError::FileRead)?;
        while let Some(entry) = entries.next_entry().await.map_err(CoreError::FileRead)? {
            let file = entry.path();
            if file.extension().is_some_and(|ext| ext == "json") {
                files.push(file);
            }
        }
        files.sort();

        let mut total = ImportSummary::default();
        for file in files {
            let summary = self.import_file(&file).await?;
            total.absorb(&summary);
        }
        Ok(total)
    }

    pub async fn import_file(&self, path: &Path) -> CoreResult<ImportSummary> {
        let text = fs::read_to_string(path).await.map_err(CoreError::FileRead)?;
        let bundle = Bundle::parse(&text)?;
        let summary = self.import_bundle(&bundle).await?;
        tracing::info!("-- Imported {}: {}", path.display(), summary);
        Ok(summary)
    }

    pub async fn import_bundle(&self, bundle: &Bundle) -> CoreResult<ImportSummary> {
        let mut summary = ImportSummary {
            bundles: 1,
            ..Default::default()
        };
        let mut ids = IdMaps::default();

        for (entry, resource) in bundle.resources() {
            if let Resource::Organization(org) = resource {
                self.import_organization(entry, org, &mut ids, &mut summary)
                    .await?;
            }
        }
        for (entry, resource) in bundle.resources() {
            if let Resource::Practitioner(practitioner) = resource {
                self.import_practitioner(entry, practitioner, &mut ids, &mut summary)
                    .await?;
            }
        }
        for (entry, resource) in bundle.resources() {
            if let Resource::Patient(patient) = resource {
                self.import_patient(entry, patient, &mut ids, &mut summary)
                    .await?;
            }
        }
        for (entry, resource) in bundle.resources() {
            if let Resource::Encounter(encounter) = resource {
                self.import_encounter(entry, encounter, &mut ids, &mut summary)
                    .await?;
            }
        }
        for (_, resource) in bundle.resources() {
            if let Resource::Condition(condition) = resource {
                self.import_condition(condition, &ids, &mut summary).await?;
            }
        }
        for (_, resource) in bundle.resources() {
            if let Resource::Observation(observation) = resource {
                self.import_observation(observation, &ids, &mut summary)
                    .await?;
            }
        }

        Ok(summary)
    }

    /// Count a rejected write as skipped; anything else is a real failure.
    fn skip_or_fail<T>(result: CoreResult<T>, what: &str, summary: &mut ImportSummary) -> CoreResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_client_error() => {
                tracing::warn!("skipping {}: {}", what, e);
                summary.skipped += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Directory resources
    // ========================================================================

    async fn import_organization(
        &self,
        entry: &BundleEntry,
        org: &fhir::Organization,
        ids: &mut IdMaps,
        summary: &mut ImportSummary,
    ) -> CoreResult<()> {
        let Some(identifier) = owned(first_identifier(&org.identifier).or(org.id.as_deref()))
        else {
            summary.skipped += 1;
            return Ok(());
        };

        let service = &self.services.organizations;
        if let Some(existing) = service.find_by_identifier(&identifier).await? {
            summary.reused += 1;
            remember(&mut ids.organizations, entry, org.id.as_deref(), existing.id);
            ids.organizations.insert(identifier, existing.id);
            return Ok(());
        }

        let kind = org.type_.first();
        let address = org.address.first();
        let new = NewOrganization {
            name: owned(org.name.as_deref()).unwrap_or_else(|| identifier.clone()),
            type_code: owned(kind.and_then(|k| k.code())),
            type_display: owned(kind.and_then(|k| k.display())),
            phone: owned(telecom_value(&org.telecom, "phone")),
            email: owned(telecom_value(&org.telecom, "email")),
            address_line: address.and_then(|a| a.line_text()),
            city: owned(address.and_then(|a| a.city.as_deref())),
            state: owned(address.and_then(|a| a.state.as_deref())),
            postal_code: owned(address.and_then(|a| a.postal_code.as_deref())),
            part_of_identifier: reference_key(org.part_of.as_ref()),
            identifier: identifier.clone(),
        };

        if let Some(created) =
            Self::skip_or_fail(service.create(new).await, "organization", summary)?
        {
            summary.organizations += 1;
            remember(&mut ids.organizations, entry, org.id.as_deref(), created.id);
            ids.organizations.insert(identifier, created.id);
        }
        Ok(())
    }

    async fn import_practitioner(
        &self,
        entry: &BundleEntry,
        practitioner: &fhir::Practitioner,
        ids: &mut IdMaps,
        summary: &mut ImportSummary,
    ) -> CoreResult<()> {
        let identifier = owned(
            first_identifier(&practitioner.identifier).or(practitioner.id.as_deref()),
        );

        let service = &self.services.practitioners;
        if let Some(identifier) = identifier.as_deref() {
            if let Some(existing) = service.find_by_identifier(identifier).await? {
                summary.reused += 1;
                remember(&mut ids.practitioners, entry, practitioner.id.as_deref(), existing.id);
                ids.practitioners.insert(identifier.to_string(), existing.id);
                return Ok(());
            }
        }

        let specialty = practitioner
            .qualification
            .iter()
            .find_map(|q| q.code.as_ref());
        let name = primary_name(&practitioner.name)
            .and_then(|n| n.full())
            .or_else(|| identifier.clone())
            .unwrap_or_else(|| "Unknown".into());
        let new = NewPractitioner {
            identifier: identifier.clone(),
            name,
            gender: owned(practitioner.gender.as_deref()),
            specialty_code: owned(specialty.and_then(|s| s.code())),
            specialty_display: owned(specialty.and_then(|s| s.display())),
            phone: owned(telecom_value(&practitioner.telecom, "phone")),
            email: owned(telecom_value(&practitioner.telecom, "email")),
            organization_id: None,
        };

        if let Some(created) =
            Self::skip_or_fail(service.create(new).await, "practitioner", summary)?
        {
            summary.practitioners += 1;
            remember(&mut ids.practitioners, entry, practitioner.id.as_deref(), created.id);
            if let Some(identifier) = identifier {
                ids.practitioners.insert(identifier, created.id);
            }
        }
        Ok(())
    }

    async fn import_patient(
        &self,
        entry: &BundleEntry,
        patient: &fhir::Patient,
        ids: &mut IdMaps,
        summary: &mut ImportSummary,
    ) -> CoreResult<()> {
        let Some(identifier) =
            owned(first_identifier(&patient.identifier).or(patient.id.as_deref()))
        else {
            summary.skipped += 1;
            return Ok(());
        };

        let service = &self.services.patients;
        if let Some(existing) = service.find_by_identifier(&identifier).await? {
            summary.reused += 1;
            remember(&mut ids.patients, entry, patient.id.as_deref(), existing.id);
            return Ok(());
        }

        let name = primary_name(&patient.name);
        let first_name = owned(name.and_then(|n| n.first_given()));
        let last_name = owned(name.and_then(|n| n.family.as_deref()));
        let birth_date = patient
            .birth_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

        let (Some(first_name), Some(last_name), Some(birth_date)) =
            (first_name, last_name, birth_date)
        else {
            tracing::warn!("skipping patient {}: missing name or birth date", identifier);
            summary.skipped += 1;
            return Ok(());
        };

        let address = patient.address.first();
        let mut new = NewPatient::new(identifier, first_name, last_name, birth_date);
        new.gender = owned(patient.gender.as_deref());
        new.phone = owned(telecom_value(&patient.telecom, "phone"));
        new.email = owned(telecom_value(&patient.telecom, "email"));
        new.address_line = address.and_then(|a| a.line_text());
        new.city = owned(address.and_then(|a| a.city.as_deref()));
        new.state = owned(address.and_then(|a| a.state.as_deref()));
        new.postal_code = owned(address.and_then(|a| a.postal_code.as_deref()));
        new.marital_status = owned(
            patient
                .marital_status
                .as_ref()
                .and_then(|m| m.display().or_else(|| m.code())),
        );
        new.language = owned(
            patient
                .communication
                .iter()
                .filter_map(|c| c.language.as_ref())
                .find_map(|l| l.display().or_else(|| l.code())),
        );
        new.race = owned(extension_text(&patient.extension, "us-core-race"));
        new.ethnicity = owned(extension_text(&patient.extension, "us-core-ethnicity"));
        new.deceased_date = owned(patient.deceased_date_time.as_deref());
        new.active = patient.active.unwrap_or(true);
        new.managing_organization_identifier =
            reference_key(patient.managing_organization.as_ref());

        if let Some(created) = Self::skip_or_fail(service.create(new).await, "patient", summary)? {
            summary.patients += 1;
            remember(&mut ids.patients, entry, patient.id.as_deref(), created.id);
        }
        Ok(())
    }

    // ========================================================================
    // Clinical resources
    // ========================================================================

    async fn import_encounter(
        &self,
        entry: &BundleEntry,
        encounter: &fhir::Encounter,
        ids: &mut IdMaps,
        summary: &mut ImportSummary,
    ) -> CoreResult<()> {
        let patient_id = local_ref(&ids.patients, encounter.subject.as_ref());
        let period = encounter.period.as_ref();
        let start_time = timestamp(period.and_then(|p| p.start.as_deref()));

        let (Some(patient_id), Some(start_time)) = (patient_id, start_time) else {
            summary.skipped += 1;
            return Ok(());
        };

        let reason = encounter.reason_code.first();
        let new = NewEncounter {
            patient_id,
            practitioner_id: local_ref(&ids.practitioners, encounter.primary_performer()),
            organization_id: local_ref(&ids.organizations, encounter.service_provider.as_ref()),
            identifier: owned(
                encounter
                    .id
                    .as_deref()
                    .or_else(|| first_identifier(&encounter.identifier)),
            ),
            status: owned(encounter.status.as_deref()).unwrap_or_else(|| "finished".into()),
            class_code: owned(encounter.class.as_ref().and_then(|c| c.code.as_deref())),
            class_display: owned(encounter.class.as_ref().and_then(|c| c.display.as_deref())),
            start_time: Some(start_time),
            end_time: timestamp(period.and_then(|p| p.end.as_deref())),
            reason_code: owned(reason.and_then(|r| r.code())),
            reason_display: owned(reason.and_then(|r| r.display())),
        };

        let result = self.services.encounters.create(new).await;
        if let Some(created) = Self::skip_or_fail(result, "encounter", summary)? {
            summary.encounters += 1;
            remember(&mut ids.encounters, entry, encounter.id.as_deref(), created.id);
        }
        Ok(())
    }

    async fn import_condition(
        &self,
        condition: &fhir::Condition,
        ids: &IdMaps,
        summary: &mut ImportSummary,
    ) -> CoreResult<()> {
        let patient_id = local_ref(&ids.patients, condition.subject.as_ref());
        let code = condition.code.as_ref();

        let (Some(patient_id), Some(code_value)) = (patient_id, owned(code.and_then(|c| c.code())))
        else {
            summary.skipped += 1;
            return Ok(());
        };

        let new = NewCondition {
            patient_id,
            encounter_id: local_ref(&ids.encounters, condition.encounter.as_ref()),
            code: code_value,
            system: owned(
                code.and_then(|c| c.first_coding())
                    .and_then(|c| c.system.as_deref()),
            ),
            display: owned(code.and_then(|c| c.display())),
            category_code: owned(condition.category.first().and_then(|c| c.code())),
            clinical_status: owned(condition.clinical_status.as_ref().and_then(|s| s.code())),
            verification_status: owned(
                condition
                    .verification_status
                    .as_ref()
                    .and_then(|s| s.code()),
            ),
            onset_time: timestamp(condition.onset()),
            abatement_time: timestamp(condition.abatement_date_time.as_deref()),
            recorded_date: timestamp(condition.recorded_date.as_deref()),
        };

        let result = self.services.conditions.create(new).await;
        if Self::skip_or_fail(result, "condition", summary)?.is_some() {
            summary.conditions += 1;
        }
        Ok(())
    }

    async fn import_observation(
        &self,
        observation: &fhir::Observation,
        ids: &IdMaps,
        summary: &mut ImportSummary,
    ) -> CoreResult<()> {
        let patient_id = local_ref(&ids.patients, observation.subject.as_ref());
        let code = observation.code.as_ref();

        let (Some(patient_id), Some(code_value)) = (patient_id, owned(code.and_then(|c| c.code())))
        else {
            summary.skipped += 1;
            return Ok(());
        };

        let base = NewObservation {
            patient_id,
            encounter_id: local_ref(&ids.encounters, observation.encounter.as_ref()),
            practitioner_id: observation
                .performer
                .iter()
                .find_map(|p| local_ref(&ids.practitioners, Some(p))),
            identifier: owned(
                observation
                    .id
                    .as_deref()
                    .or_else(|| first_identifier(&observation.identifier)),
            ),
            status: owned(observation.status.as_deref()).unwrap_or_else(|| "final".into()),
            code: code_value.clone(),
            code_system: owned(
                code.and_then(|c| c.first_coding())
                    .and_then(|c| c.system.as_deref()),
            ),
            code_display: owned(code.and_then(|c| c.display())),
            value_quantity: observation.value_quantity.as_ref().and_then(|q| q.value),
            value_unit: owned(observation.value_quantity.as_ref().and_then(|q| q.unit_text())),
            value_string: owned(observation.value_text()),
            effective_time: timestamp(observation.effective()),
            issued_time: timestamp(observation.issued.as_deref()),
        };

        let rows = if code_value == BLOOD_PRESSURE_PANEL_CODE && !observation.component.is_empty()
        {
            observation
                .component
                .iter()
                .filter_map(|component| {
                    let code = component.code.as_ref()?;
                    Some(NewObservation {
                        code: owned(code.code())?,
                        code_system: owned(
                            code.first_coding().and_then(|c| c.system.as_deref()),
                        ),
                        code_display: owned(code.display()),
                        value_quantity: component.value_quantity.as_ref().and_then(|q| q.value),
                        value_unit: owned(
                            component.value_quantity.as_ref().and_then(|q| q.unit_text()),
                        ),
                        value_string: owned(component.value_string.as_deref().or_else(|| {
                            component
                                .value_codeable_concept
                                .as_ref()
                                .and_then(|c| c.display())
                        })),
                        ..base.clone()
                    })
                })
                .collect()
        } else {
            vec![base]
        };

        for row in rows {
            let result = self.services.observations.create(row).await;
            if Self::skip_or_fail(result, "observation", summary)?.is_some() {
                summary.observations += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::ObservationFilter;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    const BUNDLE: &str = r#"{
      "resourceType": "Bundle",
      "type": "transaction",
      "entry": [
        {
          "fullUrl": "urn:uuid:org-1",
          "resource": {
            "resourceType": "Organization",
            "id": "org-1",
            "identifier": [{"system": "https://github.com/synthetichealth/synthea", "value": "org-1"}],
            "name": "Hospital of the Good Samaritan",
            "type": [{"coding": [{"code": "prov", "display": "Healthcare Provider"}]}],
            "address": [{"line": ["1 Main St"], "city": "Boston", "state": "MA", "postalCode": "02101"}]
          }
        },
        {
          "fullUrl": "urn:uuid:pr-1",
          "resource": {
            "resourceType": "Practitioner",
            "id": "pr-1",
            "identifier": [{"system": "http://hl7.org/fhir/sid/us-npi", "value": "9999912345"}],
            "name": [{"family": "House", "given": ["Gregory"], "prefix": ["Dr."]}],
            "gender": "male"
          }
        },
        {
          "fullUrl": "urn:uuid:pat-1",
          "resource": {
            "resourceType": "Patient",
            "id": "pat-1",
            "identifier": [{"value": "pat-1"}],
            "name": [{"use": "official", "family": "Lovelace", "given": ["Ada"]}],
            "telecom": [{"system": "phone", "value": "555-0101"}],
            "gender": "female",
            "birthDate": "1990-05-15",
            "extension": [{
              "url": "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race",
              "extension": [{"url": "text", "valueString": "White"}]
            }]
          }
        },
        {
          "fullUrl": "urn:uuid:enc-1",
          "resource": {
            "resourceType": "Encounter",
            "id": "enc-1",
            "status": "finished",
            "class": {"code": "AMB"},
            "subject": {"reference": "urn:uuid:pat-1"},
            "participant": [{"individual": {"reference": "Practitioner?identifier=http://hl7.org/fhir/sid/us-npi|9999912345"}}],
            "period": {"start": "2024-03-01T09:00:00-05:00", "end": "2024-03-01T09:30:00-05:00"},
            "serviceProvider": {"reference": "Organization?identifier=https://github.com/synthetichealth/synthea|org-1"}
          }
        },
        {
          "fullUrl": "urn:uuid:cond-1",
          "resource": {
            "resourceType": "Condition",
            "clinicalStatus": {"coding": [{"code": "active"}]},
            "code": {"coding": [{"system": "http://snomed.info/sct", "code": "44054006", "display": "Diabetes"}]},
            "subject": {"reference": "urn:uuid:pat-1"},
            "encounter": {"reference": "urn:uuid:enc-1"},
            "onsetDateTime": "2024-03-01T09:00:00-05:00"
          }
        },
        {
          "fullUrl": "urn:uuid:obs-1",
          "resource": {
            "resourceType": "Observation",
            "status": "final",
            "code": {"coding": [{"system": "http://loinc.org", "code": "85354-9", "display": "Blood pressure panel"}]},
            "subject": {"reference": "urn:uuid:pat-1"},
            "encounter": {"reference": "urn:uuid:enc-1"},
            "effectiveDateTime": "2024-03-01T09:05:00-05:00",
            "component": [
              {"code": {"coding": [{"code": "8462-4", "display": "Diastolic"}]}, "valueQuantity": {"value": 80, "unit": "mm[Hg]"}},
              {"code": {"coding": [{"code": "8480-6", "display": "Systolic"}]}, "valueQuantity": {"value": 120, "unit": "mm[Hg]"}}
            ]
          }
        },
        {
          "fullUrl": "urn:uuid:obs-2",
          "resource": {
            "resourceType": "Observation",
            "status": "final",
            "code": {"coding": [{"code": "8302-2"}]},
            "subject": {"reference": "urn:uuid:nobody"}
          }
        }
      ]
    }"#;

    #[tokio::test]
    async fn test_import_bundle_maps_references() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let services = Services::new(pool);
        let importer = Importer::new(services.clone());

        let bundle = Bundle::parse(BUNDLE).expect("bundle should parse");
        let summary = importer
            .import_bundle(&bundle)
            .await
            .expect("import should succeed");

        assert_eq!(summary.organizations, 1);
        assert_eq!(summary.practitioners, 1);
        assert_eq!(summary.patients, 1);
        assert_eq!(summary.encounters, 1);
        assert_eq!(summary.conditions, 1);
        assert_eq!(summary.observations, 2);
        assert_eq!(summary.skipped, 1);

        let patient = services
            .patients
            .find_by_identifier("pat-1")
            .await
            .expect("lookup")
            .expect("patient imported");
        assert_eq!(patient.race.as_deref(), Some("White"));
        assert_eq!(patient.phone.as_deref(), Some("555-0101"));

        let encounter = services.encounters.get(1).await.expect("encounter imported");
        assert_eq!(encounter.patient_id, patient.id);
        assert!(encounter.practitioner_id.is_some());
        assert!(encounter.organization_id.is_some());

        let filter = ObservationFilter {
            patient_id: Some(patient.id),
            ..Default::default()
        };
        let observations = services.observations.list(&filter).await.expect("list");
        let codes: Vec<_> = observations.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["8462-4", "8480-6"]);
        assert_eq!(observations[1].value_quantity, Some(120.0));
    }

    #[tokio::test]
    async fn test_import_directory_reuses_existing_patients() {
        let dir = TempDir::new().expect("temp dir");
        let mut file = fs::File::create(dir.path().join("ada.json")).expect("create file");
        file.write_all(BUNDLE.as_bytes()).expect("write bundle");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write other file");

        let pool = connect_in_memory().await.expect("in-memory pool");
        let importer = Importer::new(Services::new(pool));

        let first = importer
            .import_path(dir.path())
            .await
            .expect("first import should succeed");
        assert_eq!(first.bundles, 1);
        assert_eq!(first.patients, 1);

        let second = importer
            .import_path(dir.path())
            .await
            .expect("second import should succeed");
        assert_eq!(second.patients, 0);
        assert_eq!(second.reused, 3);
    }

    #[tokio::test]
    async fn test_missing_path_is_file_read_error() {
        let dir = TempDir::new().expect("temp dir");
        let pool = connect_in_memory().await.expect("in-memory pool");
        let importer = Importer::new(Services::new(pool));

        let err = importer
            .import_path(&dir.path().join("absent.json"))
            .await
            .expect_err("missing file should fail");
        assert!(matches!(err, CoreError::FileRead(_)));
    }
}
