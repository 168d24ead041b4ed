use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AiodError, Result};

/// Asset categories served by the catalog. Each maps to one endpoint segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CaseStudies,
    ComputationalAssets,
    Contacts,
    Datasets,
    EducationalResources,
    Events,
    Experiments,
    MlModels,
    News,
    Organisations,
    Persons,
    Platforms,
    Projects,
    Publications,
    Services,
    Teams,
}

impl ResourceKind {
    pub const ALL: [Self; 16] = [
        Self::CaseStudies,
        Self::ComputationalAssets,
        Self::Contacts,
        Self::Datasets,
        Self::EducationalResources,
        Self::Events,
        Self::Experiments,
        Self::MlModels,
        Self::News,
        Self::Organisations,
        Self::Persons,
        Self::Platforms,
        Self::Projects,
        Self::Publications,
        Self::Services,
        Self::Teams,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CaseStudies => "case_studies",
            Self::ComputationalAssets => "computational_assets",
            Self::Contacts => "contacts",
            Self::Datasets => "datasets",
            Self::EducationalResources => "educational_resources",
            Self::Events => "events",
            Self::Experiments => "experiments",
            Self::MlModels => "ml_models",
            Self::News => "news",
            Self::Organisations => "organisations",
            Self::Persons => "persons",
            Self::Platforms => "platforms",
            Self::Projects => "projects",
            Self::Publications => "publications",
            Self::Services => "services",
            Self::Teams => "teams",
        }
    }

    #[must_use]
    pub fn collection_path(&self, api_version: &str) -> String {
        format!("{}/{api_version}", self.as_str())
    }

    #[must_use]
    pub fn count_path(&self) -> String {
        format!("counts/{}/v1", self.as_str())
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AiodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AiodError::EndpointUndefined(s.to_string()))
    }
}

/// Controlled vocabularies the catalog exposes next to the asset kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxonomy {
    ApplicationAreas,
    EducationalResourceTypes,
    EventModes,
    EventStatuses,
    Languages,
    Licenses,
    NewsCategories,
    OrganisationTypes,
    PublicationTypes,
    ResearchAreas,
    ScientificDomains,
    Statuses,
}

impl Taxonomy {
    pub const ALL: [Self; 12] = [
        Self::ApplicationAreas,
        Self::EducationalResourceTypes,
        Self::EventModes,
        Self::EventStatuses,
        Self::Languages,
        Self::Licenses,
        Self::NewsCategories,
        Self::OrganisationTypes,
        Self::PublicationTypes,
        Self::ResearchAreas,
        Self::ScientificDomains,
        Self::Statuses,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationAreas => "application_areas",
            Self::EducationalResourceTypes => "educational_resource_types",
            Self::EventModes => "event_modes",
            Self::EventStatuses => "event_statuses",
            Self::Languages => "languages",
            Self::Licenses => "licenses",
            Self::NewsCategories => "news_categories",
            Self::OrganisationTypes => "organisation_types",
            Self::PublicationTypes => "publication_types",
            Self::ResearchAreas => "research_areas",
            Self::ScientificDomains => "scientific_domains",
            Self::Statuses => "statuses",
        }
    }

    #[must_use]
    pub fn path(&self, api_version: &str) -> String {
        format!("{}/{api_version}", self.as_str())
    }
}

impl Display for Taxonomy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Taxonomy {
    type Err = AiodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|taxonomy| taxonomy.as_str() == s)
            .ok_or_else(|| AiodError::EndpointUndefined(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_parses_back_from_its_name() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().expect("parse"), kind);
        }
    }

    #[test]
    fn unknown_kind_is_endpoint_undefined() {
        let err = "widgets".parse::<ResourceKind>().expect_err("must fail");
        assert!(matches!(err, AiodError::EndpointUndefined(ref kind) if kind == "widgets"));
        assert!(err.is_local());
    }

    #[test]
    fn paths_follow_kind_and_version() {
        assert_eq!(ResourceKind::Datasets.collection_path("v1"), "datasets/v1");
        assert_eq!(ResourceKind::MlModels.collection_path("v2"), "ml_models/v2");
        assert_eq!(ResourceKind::News.count_path(), "counts/news/v1");
    }

    #[test]
    fn taxonomies_parse_and_name_their_endpoint() {
        for taxonomy in Taxonomy::ALL {
            assert_eq!(taxonomy.as_str().parse::<Taxonomy>().expect("parse"), taxonomy);
        }
        assert_eq!(Taxonomy::Licenses.path("v1"), "licenses/v1");

        let err = "datasets".parse::<Taxonomy>().expect_err("asset kind is not a taxonomy");
        assert!(matches!(err, AiodError::EndpointUndefined(_)));
    }
}
