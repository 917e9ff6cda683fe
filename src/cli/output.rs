//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! plans and validation results in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::planner::{DeploymentUpdateStep, StepAction, UpdatePlan};
use crate::topology::{TopologyHasher, ValidationSummary};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Step row for table display.
#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Entity")]
    entity_type: String,
    #[tabled(rename = "Id")]
    entity_id: String,
}

/// Step row with its topology rank.
#[derive(Tabled)]
struct DetailedStepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Entity")]
    entity_type: String,
    #[tabled(rename = "Id")]
    entity_id: String,
    #[tabled(rename = "Order")]
    order: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an update plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &UpdatePlan, detailed: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan, detailed),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &UpdatePlan, detailed: bool) -> String {
        if plan.is_empty() {
            return format!(
                "{} No changes required - deployment matches the plan.\n",
                "✓".green()
            );
        }

        let mut output = String::new();
        let _ = writeln!(output, "\nUpdate Plan {}", plan.id);

        if detailed {
            let hasher = TopologyHasher::new();
            let _ = writeln!(output, "   Current: {}", hasher.short_hash(&plan.current_hash));
            let _ = writeln!(output, "   Target:  {}", hasher.short_hash(&plan.target_hash));
            let _ = writeln!(output, "   Created: {}", plan.created_at.format("%Y-%m-%d %H:%M:%S"));
        }
        output.push('\n');

        if !plan.steps.is_empty() {
            let table = if detailed {
                Table::new(plan.steps.iter().enumerate().map(|(i, s)| DetailedStepRow {
                    index: i + 1,
                    action: Self::format_action(s.action()),
                    entity_type: s.entity_type().to_string(),
                    entity_id: s.entity_id().to_string(),
                    order: s.topology_order().map_or_else(|| String::from("-"), |o| o.to_string()),
                }))
                .to_string()
            } else {
                Table::new(plan.steps.iter().enumerate().map(|(i, s)| StepRow {
                    index: i + 1,
                    action: Self::format_action(s.action()),
                    entity_type: s.entity_type().to_string(),
                    entity_id: s.entity_id().to_string(),
                }))
                .to_string()
            };
            output.push_str(&table);
            output.push('\n');
        }

        let _ = write!(
            output,
            "\nPlan: {} to add, {} to modify, {} to remove\n",
            plan.count(StepAction::Add).to_string().green(),
            plan.count(StepAction::Modify).to_string().yellow(),
            plan.count(StepAction::Remove).to_string().red()
        );

        if !plan.can_apply_incrementally() {
            let _ = write!(
                output,
                "\n{} Unsupported changes (full redeploy required):\n",
                "⚠".yellow()
            );
            for step in &plan.unsupported_steps {
                let _ = writeln!(output, "   - {}", Self::format_unsupported(step));
            }
        }

        output
    }

    /// Formats a validation summary.
    #[must_use]
    pub fn format_validation(&self, label: &str, summary: &ValidationSummary) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&ValidationJson::new(label, summary))
                .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} {label} is valid\n\n", "✓".green());
                let _ = writeln!(output, "   Nodes: {}", summary.nodes);
                let _ = writeln!(output, "   Relationships: {}", summary.relationships);
                let _ = writeln!(output, "   Workflows: {}", summary.workflows);

                if !summary.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &summary.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                output
            }
        }
    }

    /// Formats an action with color.
    fn format_action(action: StepAction) -> String {
        match action {
            StepAction::Add => "+add".green().to_string(),
            StepAction::Modify => "~modify".yellow().to_string(),
            StepAction::Remove => "-remove".red().to_string(),
        }
    }

    fn format_unsupported(step: &DeploymentUpdateStep) -> String {
        format!("{} {} {}", step.action(), step.entity_type(), step.entity_id())
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct ValidationJson<'a> {
    document: &'a str,
    valid: bool,
    nodes: usize,
    relationships: usize,
    workflows: usize,
    warnings: &'a [String],
}

impl<'a> ValidationJson<'a> {
    const fn new(document: &'a str, summary: &'a ValidationSummary) -> Self {
        Self {
            document,
            valid: true,
            nodes: summary.nodes,
            relationships: summary.relationships,
            workflows: summary.workflows,
            warnings: summary.warnings.as_slice(),
        }
    }
}
