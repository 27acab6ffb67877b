//! Closer: sales-call analysis and proposal drafting.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sovereign_core::validation::{FieldIssue, Validate, require_non_empty};

use super::structured::structured;
use super::{AiService, GenerationError};

const AGENT_TYPE: &str = "closer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
}

/// CRM stage for a 0..=100 deal likelihood.
pub fn determine_stage(likelihood: i32) -> DealStage {
    match likelihood {
        l if l >= 80 => DealStage::Negotiation,
        l if l >= 60 => DealStage::Proposal,
        l if l >= 40 => DealStage::Qualified,
        _ => DealStage::Lead,
    }
}

/// Next weekday after `today`. Sunday rolls to Monday.
pub fn next_business_day(today: NaiveDate) -> NaiveDate {
    let days = match today.weekday() {
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        _ => 1,
    };
    today + Duration::days(days)
}

pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallAnalysisRequest {
    pub transcript: String,
    pub client_name: String,
}

impl Validate for CallAnalysisRequest {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "transcript", &self.transcript);
        require_non_empty(&mut issues, "clientName", &self.client_name);
        issues
    }
}

/// What the model is asked for; stage and follow-up are derived locally.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallInsights {
    summary: String,
    #[serde(default)]
    pain_points: Vec<String>,
    #[serde(default)]
    objections: Vec<String>,
    #[serde(default)]
    next_steps: Vec<String>,
    deal_likelihood: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallAnalysis {
    pub client_name: String,
    pub summary: String,
    pub pain_points: Vec<String>,
    pub objections: Vec<String>,
    pub next_steps: Vec<String>,
    pub deal_likelihood: i32,
    pub stage: DealStage,
    /// ISO date (`YYYY-MM-DD`)
    pub follow_up_date: String,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub client_name: String,
    pub project_scope: String,
    /// Budget in cents, when known.
    #[serde(default)]
    pub budget: Option<i32>,
}

impl Validate for ProposalRequest {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "clientName", &self.client_name);
        require_non_empty(&mut issues, "projectScope", &self.project_scope);
        if self.budget.is_some_and(|b| b < 0) {
            issues.push(FieldIssue::new("budget", "budget must be >= 0"));
        }
        issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub title: String,
    pub executive_summary: String,
    pub deliverables: Vec<String>,
    pub timeline: String,
    /// Cents
    pub investment: i32,
    pub terms: String,
}

pub struct CloserAgent<'a> {
    ai: &'a AiService,
}

impl<'a> CloserAgent<'a> {
    pub fn new(ai: &'a AiService) -> Self {
        Self { ai }
    }

    pub async fn analyze_call(
        &self,
        request: &CallAnalysisRequest,
    ) -> Result<CallAnalysis, GenerationError> {
        let prompt = format!(
            "Analyze this sales call with {} and respond with JSON containing summary, \
             painPoints, objections, nextSteps and dealLikelihood (0-100).\n\nTranscript:\n{}",
            request.client_name, request.transcript
        );
        let generation = self.ai.complete(&prompt, AGENT_TYPE).await?;
        let insights = structured::<CallInsights>(&generation).unwrap_or_else(fallback_insights);

        let likelihood = insights.deal_likelihood.clamp(0, 100);
        let follow_up = next_business_day(today_in(self.ai.timezone()));
        Ok(CallAnalysis {
            client_name: request.client_name.clone(),
            summary: insights.summary,
            pain_points: insights.pain_points,
            objections: insights.objections,
            next_steps: insights.next_steps,
            deal_likelihood: likelihood,
            stage: determine_stage(likelihood),
            follow_up_date: follow_up.format("%Y-%m-%d").to_string(),
        })
    }

    pub async fn draft_proposal(
        &self,
        request: &ProposalRequest,
    ) -> Result<ProposalDraft, GenerationError> {
        let prompt = format!(
            "Draft a proposal as JSON (title, executiveSummary, deliverables, timeline, \
             investment, terms) for {}. Scope: {}",
            request.client_name, request.project_scope
        );
        let generation = self.ai.complete(&prompt, AGENT_TYPE).await?;
        Ok(structured(&generation).unwrap_or_else(|| fallback_proposal(request)))
    }
}

fn fallback_insights() -> CallInsights {
    CallInsights {
        summary: "Productive call. The client is interested and wants to see a concrete plan."
            .to_string(),
        pain_points: vec!["Too much time spent on manual follow-up".to_string()],
        objections: vec!["Budget timing".to_string()],
        next_steps: vec![
            "Send proposal".to_string(),
            "Schedule follow-up call".to_string(),
        ],
        deal_likelihood: 65,
    }
}

fn fallback_proposal(request: &ProposalRequest) -> ProposalDraft {
    ProposalDraft {
        title: format!("Proposal for {}", request.client_name),
        executive_summary: format!(
            "We will deliver {} with a focus on measurable time savings.",
            request.project_scope
        ),
        deliverables: vec![
            "Discovery workshop".to_string(),
            "Implementation".to_string(),
            "Handover and training".to_string(),
        ],
        timeline: "4-6 weeks".to_string(),
        investment: request.budget.unwrap_or(500_000),
        terms: "50% upfront, 50% on delivery".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn stage_thresholds() {
        assert_eq!(determine_stage(100), DealStage::Negotiation);
        assert_eq!(determine_stage(80), DealStage::Negotiation);
        assert_eq!(determine_stage(79), DealStage::Proposal);
        assert_eq!(determine_stage(60), DealStage::Proposal);
        assert_eq!(determine_stage(59), DealStage::Qualified);
        assert_eq!(determine_stage(40), DealStage::Qualified);
        assert_eq!(determine_stage(39), DealStage::Lead);
        assert_eq!(determine_stage(0), DealStage::Lead);
    }

    #[test]
    fn next_business_day_skips_weekends() {
        // 2026-10-12 is a Monday
        assert_eq!(next_business_day(date(2026, 10, 12)), date(2026, 10, 13));
        assert_eq!(next_business_day(date(2026, 10, 15)), date(2026, 10, 16));
        assert_eq!(next_business_day(date(2026, 10, 16)), date(2026, 10, 19));
        assert_eq!(next_business_day(date(2026, 10, 17)), date(2026, 10, 19));
        assert_eq!(next_business_day(date(2026, 10, 18)), date(2026, 10, 19));
    }

    #[test]
    fn next_business_day_crosses_month_end() {
        // Friday 2026-10-30
        assert_eq!(next_business_day(date(2026, 10, 30)), date(2026, 11, 2));
    }

    #[tokio::test]
    async fn call_analysis_derives_stage_and_follow_up() {
        let ai = AiService::mock(chrono_tz::UTC);
        let analysis = CloserAgent::new(&ai)
            .analyze_call(&CallAnalysisRequest {
                transcript: "We talked pricing.".into(),
                client_name: "Acme".into(),
            })
            .await
            .expect("mock never fails");

        assert_eq!(analysis.stage, determine_stage(analysis.deal_likelihood));
        let follow_up = NaiveDate::parse_from_str(&analysis.follow_up_date, "%Y-%m-%d")
            .expect("ISO date");
        assert!(!matches!(follow_up.weekday(), Weekday::Sat | Weekday::Sun));
    }

    #[tokio::test]
    async fn proposal_fallback_uses_the_stated_budget() {
        let ai = AiService::mock(chrono_tz::UTC);
        let draft = CloserAgent::new(&ai)
            .draft_proposal(&ProposalRequest {
                client_name: "Acme".into(),
                project_scope: "CRM automation".into(),
                budget: Some(1_200_000),
            })
            .await
            .expect("mock never fails");
        assert_eq!(draft.investment, 1_200_000);
        assert!(draft.title.contains("Acme"));
    }
}
