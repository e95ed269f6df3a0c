//! Terminal rendering for procurement logs, thread tables, drafts and inbox cards.

use sitelog_core::thread::{follow_ups_by_project, risk_distribution};
use sitelog_core::{
    EmailDraft, EmailSummary, NonResponsiveThread, ProcurementRecord, ProcurementStats,
    ThreadStats,
};

const MAX_CELL: usize = 28;

// ── Helpers ──

/// Cut `s` to `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "-" } else { s }
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", label, value);
}

// ── Projects ──

pub fn print_projects(projects: &[String]) {
    if projects.is_empty() {
        println!("No projects.");
        return;
    }
    for project in projects {
        println!("{project}");
    }
}

// ── Procurement ──

pub fn print_procurement(project: &str, log: &[ProcurementRecord], stats: &ProcurementStats) {
    println!("=== {project} — Procurement ===");
    println!();

    if log.is_empty() {
        println!("No procurement records.");
        println!();
    } else {
        print_procurement_table(log);
    }

    println!("Summary");
    field("Total items", stats.total_items);
    field("Pending confirmations", stats.pending_confirmations);
    field("Confirmed", stats.confirmed_items);
    field("Delayed", stats.delayed_items);
    field("Pending", format!("{:.0}%", stats.pending_percentage));
    field("Risk", stats.risk_level.label());
    println!();

    println!("Insights");
    println!("  {}", stats.headline());
    println!("  {}", stats.risk_tip());
    println!();

    print_vendor_panels(stats);
}

fn print_procurement_table(log: &[ProcurementRecord]) {
    println!(
        "{:<28} {:<20} {:>8} {:<8} {:>5} {:<12} {:<9}",
        "Material", "Vendor", "Qty", "Unit", "Lead", "Delivery", "Status"
    );
    for r in log {
        println!(
            "{:<28} {:<20} {:>8} {:<8} {:>5} {:<12} {:<9}",
            truncate(or_dash(&r.material_equipment), MAX_CELL),
            truncate(or_dash(&r.vendor_name), 20),
            r.quantity,
            truncate(or_dash(&r.unit), 8),
            r.lead_time_days,
            truncate(r.delivery_date.as_deref().unwrap_or("-"), 12),
            r.status,
        );
    }
    println!();
}

fn print_vendor_panels(stats: &ProcurementStats) {
    for group in &stats.vendor_groups {
        println!("{}", or_dash(&group.vendor_name));
        for r in &group.records {
            println!(
                "  - {} ({} {}) {}",
                or_dash(&r.material_equipment),
                r.quantity,
                r.unit,
                r.status
            );
            if !r.remarks.is_empty() {
                println!("    {}", r.remarks);
            }
        }
        if let Some(ai) = group.representative_analysis() {
            if !ai.impact.is_empty() {
                field("Impact", &ai.impact);
            }
            if !ai.recommendation.is_empty() {
                field("Recommendation", &ai.recommendation);
            }
        }
        println!();
    }
}

// ── Non-responsive threads ──

/// Thread table, followed by KPIs and charts when `insights` is given.
pub fn print_threads(
    project: &str,
    threads: &[NonResponsiveThread],
    insights: Option<&ThreadStats>,
) {
    println!("=== {project} — Non-responsive threads ===");
    println!();

    if threads.is_empty() {
        println!("No non-responsive threads.");
        println!();
    } else {
        println!(
            "{:>3}  {:<32} {:<16} {:<7} {:>9} {:>5}",
            "#", "Subject", "Impact", "Risk", "Follow-ups", "Days"
        );
        for (i, t) in threads.iter().enumerate() {
            println!(
                "{:>3}  {:<32} {:<16} {:<7} {:>9} {:>5}",
                i,
                truncate(or_dash(&t.thread_subject), 32),
                truncate(or_dash(&t.impact_area), 16),
                t.risk_level,
                t.counts.follow_up_count,
                t.timeline.days_between_first_and_last,
            );
        }
        println!();
    }

    let Some(stats) = insights else {
        return;
    };

    println!("Summary");
    field("Threads", stats.total_threads);
    field("High risk", stats.high_risk);
    field("Avg follow-ups", format!("{:.1}", stats.avg_follow_ups));
    field("Responsiveness", format!("{}%", stats.responsiveness));
    println!();

    println!("Risk distribution");
    for (risk, count) in risk_distribution(threads) {
        field(risk.as_str(), count);
    }
    println!();

    let follow_ups = follow_ups_by_project(threads);
    if !follow_ups.is_empty() {
        println!("Follow-ups by project");
        for (project, count) in follow_ups {
            field(&project, count);
        }
        println!();
    }
}

pub fn print_thread_card(index: usize, thread: &NonResponsiveThread) {
    println!("=== [{index}] {} ===", or_dash(&thread.thread_subject));
    println!();

    println!("Overview");
    field("Project", or_dash(&thread.project_guess));
    field("Impact area", or_dash(&thread.impact_area));
    field("Risk", thread.risk_level);
    field("Issue", or_dash(&thread.issue_detected));
    field("Recommended action", or_dash(&thread.recommended_action));
    field("Response detected", thread.response_detected);
    println!();

    println!("Timeline");
    field(
        "First email",
        thread.timeline.first_email_date.as_deref().unwrap_or("-"),
    );
    field(
        "Last email",
        thread.timeline.last_email_date.as_deref().unwrap_or("-"),
    );
    field("Days elapsed", thread.timeline.days_between_first_and_last);
    field("Follow-ups", thread.counts.follow_up_count);
    field("Unanswered", thread.counts.unanswered_emails);
    println!();

    if !thread.conversation_history.is_empty() {
        println!("Conversation");
        for msg in &thread.conversation_history {
            println!("  [{}] {} → {}", or_dash(&msg.date), msg.from, msg.to);
            println!("  {}", msg.subject);
            for line in msg.body.lines() {
                println!("    {line}");
            }
            println!();
        }
    }
}

// ── Drafts ──

pub fn print_draft(draft: &EmailDraft) {
    println!("To:      {}", draft.to);
    println!("Subject: {}", draft.subject);
    println!();
    println!("{}", draft.body);
}

pub fn print_suggestions(replies: &[String]) {
    if replies.is_empty() {
        println!("No suggestions.");
        return;
    }
    for (i, reply) in replies.iter().enumerate() {
        println!("--- Suggestion {} ---", i + 1);
        println!("{reply}");
        println!();
    }
}

// ── Inbox ──

pub fn print_inbox(project: &str, emails: &[EmailSummary]) {
    println!("=== {project} — Inbox ===");
    println!();
    if emails.is_empty() {
        println!("No emails match.");
        return;
    }
    for (i, e) in emails.iter().enumerate() {
        println!("{i:>3}  {} [{}]", or_dash(&e.subject), or_dash(&e.category));
        field("From", or_dash(&e.from));
        if let Some(priority) = &e.priority {
            field("Priority", priority);
        }
        if let Some(due) = &e.due_date {
            field("Due", due);
        }
        if !e.summary.is_empty() {
            field("Summary", &e.summary);
        }
        if let Some(action) = &e.action_required {
            field("Action", action);
        }
        println!();
    }
}
