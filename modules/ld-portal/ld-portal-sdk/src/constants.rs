//! Reference lists shared with the registration form and the admin console.

/// Predefined primary use cases. Any other non-empty value is a custom use case.
pub const USE_CASES: &[&str] = &[
    "Training progress tracking and analytics",
    "Employee performance visualization",
    "Learning outcome assessment dashboards",
    "Compliance training monitoring",
    "Skills gap analysis and reporting",
    "Course effectiveness measurement",
    "Real-time learning analytics",
    "Custom training reports for management",
    "Interactive data presentations",
    "Automated insights and recommendations",
];

pub const INDUSTRY_DOMAINS: &[&str] = &[
    "Healthcare",
    "Agriculture",
    "Drone Technology",
    "Manufacturing",
    "Information Technology",
    "Finance & Banking",
    "Education",
    "Retail & E-commerce",
    "Construction",
    "Automotive",
    "Aerospace",
    "Energy & Utilities",
    "Telecommunications",
    "Real Estate",
    "Food & Beverage",
    "Logistics & Supply Chain",
    "Pharmaceuticals",
    "Media & Entertainment",
    "Government",
    "Non-Profit",
];

pub const INTEGRATIONS: &[&str] = &[
    "Salesforce",
    "Databricks",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "AWS S3",
    "Azure",
    "Google Cloud",
    "Tableau",
    "Power BI",
    "Slack",
    "Microsoft Teams",
    "Jira",
    "Confluence",
    "HubSpot",
    "Zendesk",
];

/// Lifetime of a demo account, in days.
pub const DEMO_ACCOUNT_DAYS: i64 = 10;

/// Shown in place of missing optional text.
pub const NOT_SPECIFIED: &str = "Not specified";
