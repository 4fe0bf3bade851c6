use crate::infra::{
    demo_commission_schedule, InMemoryCommissionLedger, InMemoryProjectRepository,
    InMemoryProposalRepository,
};
use clap::Args;
use solar_crm::config::AppConfig;
use solar_crm::error::AppError;
use solar_crm::workflows::commissions::AgentCommissionSummary;
use solar_crm::workflows::projects::{
    CompleteMilestoneRequest, MilestoneKey, OpenProjectRequest, ProjectService,
};
use solar_crm::workflows::proposals::{
    ProposalRequest, ProposalService, ProposalView, BREAK_EVEN_CAP_YEARS, DEFAULT_MONTHLY_BILL,
};
use solar_crm::workflows::solar::{
    qualify_lead_roof, QualificationView, RoofMeasurement, RoofMeasurementImporter,
};
use solar_crm::workflows::{AgentId, LeadId};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ProposalArgs {
    /// Usable roof area in square meters
    #[arg(long)]
    pub(crate) area: f64,
    /// Annual irradiance reading from the lookup (kWh/m²)
    #[arg(long)]
    pub(crate) irradiance: f64,
    /// Shaded share of the roof, 0-100
    #[arg(long, default_value_t = 0.0)]
    pub(crate) shading: f64,
    /// Installed cost per kW
    #[arg(long)]
    pub(crate) cost_per_kw: f64,
    /// Loan APR as a fraction (0.055 for 5.5%)
    #[arg(long)]
    pub(crate) apr: f64,
    /// Loan term in whole years
    #[arg(long)]
    pub(crate) term_years: u32,
    /// Utility rate per kWh; skips the regional lookup
    #[arg(long, conflicts_with = "zip")]
    pub(crate) utility_rate: Option<f64>,
    /// Service ZIP code for the regional rate lookup
    #[arg(long)]
    pub(crate) zip: Option<String>,
    /// Current monthly utility bill
    #[arg(long, default_value_t = DEFAULT_MONTHLY_BILL)]
    pub(crate) monthly_bill: f64,
}

#[derive(Args, Debug)]
pub(crate) struct QualifyArgs {
    /// CSV export with lead_id,roof_area_m2,irradiance_kwh_m2,shading_percent
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Only list leads whose roof passed qualification
    #[arg(long)]
    pub(crate) qualified_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Agent credited with the demo deal
    #[arg(long, default_value = "agent-demo")]
    pub(crate) agent: String,
    /// Last milestone to complete (snake_case key)
    #[arg(long, default_value = "pto_granted")]
    pub(crate) through: MilestoneKey,
    /// Stop after the proposal
    #[arg(long)]
    pub(crate) skip_projects: bool,
}

pub(crate) fn run_proposal(args: ProposalArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = ProposalService::new(
        Arc::new(InMemoryProposalRepository::default()),
        config.model,
    );

    let lead_id = LeadId("cli-lead".to_string());
    let measurement = RoofMeasurement::new(args.area, args.irradiance, args.shading);
    let qualification = match service.qualify(lead_id.clone(), measurement) {
        Ok(outcome) => outcome.view(),
        Err(err) => {
            println!("Qualification unavailable: {}", err);
            return Ok(());
        }
    };
    render_qualification(&qualification);

    let request = ProposalRequest {
        system_cost_per_kw: args.cost_per_kw,
        loan_apr_fraction: args.apr,
        loan_term_years: args.term_years,
        ppa_rate_per_kwh: 0.0,
        utility_rate_override: args.utility_rate,
        current_monthly_bill: args.monthly_bill,
        address: args.zip,
    };
    match service.generate(&lead_id, &request) {
        Ok(record) => render_proposal(&record.view()),
        Err(err) => println!("Proposal rejected: {}", err),
    }

    Ok(())
}

pub(crate) fn run_qualify(args: QualifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let surveys = RoofMeasurementImporter::from_path(&args.csv)?;

    println!("Roof qualification for {}", args.csv.display());
    let mut qualified = 0;
    for survey in &surveys {
        let outcome =
            qualify_lead_roof(survey.lead_id.clone(), &survey.measurement, &config.model);
        let view = outcome.view();
        if view.roof_viable {
            qualified += 1;
        } else if args.qualified_only {
            continue;
        }
        println!(
            "- {}: score {} | shading {} | {} kWh/yr | {} ({})",
            view.lead_id,
            view.solar_score,
            view.shading_score,
            view.estimated_annual_production_kwh,
            view.lead_status,
            view.viability_reason
        );
    }
    println!("{} of {} roofs qualified", qualified, surveys.len());

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        agent,
        through,
        skip_projects,
    } = args;
    let config = AppConfig::load()?;

    println!("Solar sales demo");
    let proposals = Arc::new(ProposalService::new(
        Arc::new(InMemoryProposalRepository::default()),
        config.model,
    ));
    let lead_id = LeadId("lead-demo-001".to_string());
    let roof = RoofMeasurement::new(50.0, 1500.0, 15.0);
    let qualification = match proposals.qualify(lead_id.clone(), roof) {
        Ok(outcome) => outcome.view(),
        Err(err) => {
            println!("  Qualification unavailable: {}", err);
            return Ok(());
        }
    };
    render_qualification(&qualification);

    let request = ProposalRequest {
        system_cost_per_kw: 2850.0,
        loan_apr_fraction: 0.055,
        loan_term_years: 20,
        ppa_rate_per_kwh: 0.0,
        utility_rate_override: None,
        current_monthly_bill: DEFAULT_MONTHLY_BILL,
        address: Some("410 W Van Buren St, Phoenix, AZ 85001".to_string()),
    };
    let proposal = match proposals.generate(&lead_id, &request) {
        Ok(record) => record,
        Err(err) => {
            println!("  Proposal rejected: {}", err);
            return Ok(());
        }
    };
    render_proposal(&proposal.view());

    if skip_projects {
        return Ok(());
    }

    let mut commissions = config.commissions.clone();
    if commissions.schedule.total_percent() == 0.0 {
        commissions.schedule = demo_commission_schedule();
        println!("\nNo COMMISSION_PCT_* settings found; using the demo payout split");
    }
    let projects = ProjectService::new(
        Arc::new(InMemoryProjectRepository::default()),
        Arc::new(InMemoryCommissionLedger::default()),
        commissions,
    )
    .with_gross_value_lookup(proposals);

    let agent_id = AgentId(agent);
    let project = match projects.open(OpenProjectRequest {
        lead_id,
        agent_id: Some(agent_id.clone()),
        project_gross_value: None,
    }) {
        Ok(opened) => opened.record,
        Err(err) => {
            println!("  Project could not be opened: {}", err);
            return Ok(());
        }
    };
    println!(
        "\nProject {} opened for {} ({} milestones, gross value ${:.0})",
        project.project_id,
        project.lead_id,
        project.milestones.len(),
        project.project_gross_value
    );

    if let Err(err) = projects.complete(
        &project.project_id,
        MilestoneKey::PermitApproved,
        CompleteMilestoneRequest::default(),
    ) {
        println!("- Permit approval attempted early: {}", err);
    }

    for key in MilestoneKey::ordered() {
        let request = CompleteMilestoneRequest {
            completed_by: Some(agent_id.0.clone()),
            ..CompleteMilestoneRequest::default()
        };
        match projects.complete(&project.project_id, key, request) {
            Ok(report) => {
                let unlocked = report
                    .commission_unlock
                    .as_ref()
                    .filter(|unlock| unlock.amount > 0.0)
                    .map(|unlock| format!(" | unlocked ${:.0}", unlock.amount))
                    .unwrap_or_default();
                println!(
                    "- {} [{}%]{}",
                    key.label(),
                    report.progress.percent_complete,
                    unlocked
                );
            }
            Err(err) => {
                println!("- {}: {}", key.label(), err);
                break;
            }
        }
        if key == through {
            break;
        }
    }

    match projects.commission_summary(&agent_id) {
        Ok(summary) => render_commission_summary(&summary),
        Err(err) => println!("  Commission summary unavailable: {}", err),
    }

    Ok(())
}

fn render_qualification(view: &QualificationView) {
    println!("Roof qualification for {}", view.lead_id);
    println!(
        "- Solar score {} (shading score {}) -> {}",
        view.solar_score, view.shading_score, view.lead_status
    );
    println!("- {}", view.viability_reason);
    println!(
        "- Estimated production {} kWh/yr",
        view.estimated_annual_production_kwh
    );
}

fn render_proposal(view: &ProposalView) {
    let breakdown = &view.breakdown;
    println!("\nProposal");
    println!(
        "- Utility rate ${:.2}/kWh ({}) | current bill ${:.0}/mo",
        view.utility_rate_per_kwh, view.utility_rate_source, view.current_monthly_bill
    );
    println!(
        "- System size {:.1} kW | gross ${:.0} | federal credit ${:.0} | net ${:.0}",
        breakdown.system_size_kw,
        breakdown.gross_cost,
        breakdown.incentive_credit,
        breakdown.net_cost_after_incentives
    );
    println!(
        "- Loan payment ${:.0}/mo | savings ${:.0}/mo (${:.0}/yr)",
        breakdown.estimated_monthly_payment,
        breakdown.estimated_monthly_savings,
        breakdown.estimated_annual_savings
    );
    if breakdown.break_even_years >= BREAK_EVEN_CAP_YEARS {
        println!("- Break-even: {}+ years", BREAK_EVEN_CAP_YEARS);
    } else {
        println!("- Break-even: {} years", breakdown.break_even_years);
    }
}

fn render_commission_summary(summary: &AgentCommissionSummary) {
    println!("\nCommissions for {}", summary.agent_id);
    println!(
        "- pending ${:.0} | confirmed ${:.0} | paid ${:.0} | lifetime ${:.0}",
        summary.pending, summary.confirmed, summary.paid, summary.total_lifetime
    );
}
