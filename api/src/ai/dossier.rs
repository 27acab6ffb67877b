//! Dossier: prospect research briefs.

use serde::{Deserialize, Serialize};
use sovereign_core::validation::{FieldIssue, Validate, require_non_empty};

use super::structured::structured;
use super::{AiService, GenerationError};

const AGENT_TYPE: &str = "dossier";

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for Prospect {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "name", &self.name);
        require_non_empty(&mut issues, "company", &self.company);
        issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProspectDossier {
    pub name: String,
    pub company: String,
    pub summary: String,
    pub pain_points: Vec<String>,
    pub talking_points: Vec<String>,
    pub estimated_budget: String,
    /// 0..=100
    pub fit_score: i32,
}

pub struct DossierAgent<'a> {
    ai: &'a AiService,
}

impl<'a> DossierAgent<'a> {
    pub fn new(ai: &'a AiService) -> Self {
        Self { ai }
    }

    pub async fn build(&self, prospect: &Prospect) -> Result<ProspectDossier, GenerationError> {
        let prompt = format!(
            "Build a prospect dossier as JSON (name, company, summary, painPoints, talkingPoints, \
             estimatedBudget, fitScore) for {} ({}) at {}. Notes: {}",
            prospect.name,
            prospect.role.as_deref().unwrap_or("unknown role"),
            prospect.company,
            prospect.notes.as_deref().unwrap_or("none"),
        );
        let generation = self.ai.complete(&prompt, AGENT_TYPE).await?;
        let dossier = structured::<ProspectDossier>(&generation)
            .map(|mut d| {
                d.fit_score = d.fit_score.clamp(0, 100);
                d
            })
            .unwrap_or_else(|| fallback(prospect));
        Ok(dossier)
    }
}

fn fallback(prospect: &Prospect) -> ProspectDossier {
    ProspectDossier {
        name: prospect.name.clone(),
        company: prospect.company.clone(),
        summary: format!(
            "{} at {} is a potential fit. Research is pending a live data source.",
            prospect.name, prospect.company
        ),
        pain_points: vec![
            "Manual processes eating founder time".to_string(),
            "Inconsistent lead follow-up".to_string(),
        ],
        talking_points: vec![
            "Hours reclaimed per week through automation".to_string(),
            "Agents that escalate only real decisions".to_string(),
        ],
        estimated_budget: "$5k-$15k".to_string(),
        fit_score: 50,
    }
}
