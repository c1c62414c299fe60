//! Filter bindings and KPI sets of the admin and intern dashboards.

use std::sync::Arc;

use ld_portal_sdk::constants::USE_CASES;
use ld_portal_sdk::{
    CustomerRequest, CustomerRequestField, DemoAccount, DemoAccountField, Intern, InternField,
    PortalClientV1, RequestStatus, Specialization,
};
use ldp_query::{FieldMap, MetricSpec, Rounding};

use super::sources::{
    AdminCustomerRequests, AdminDemoAccounts, AdminInterns, InternDemoAccounts, InternRequests,
};
use super::view::RecordCollectionView;

/// Score from which a completed request counts as a satisfied client.
pub const SATISFIED_SCORE: f64 = 8.0;

const CONTACT_SEARCH: [CustomerRequestField; 5] = [
    CustomerRequestField::FirstName,
    CustomerRequestField::LastName,
    CustomerRequestField::Company,
    CustomerRequestField::Email,
    CustomerRequestField::Phone,
];

#[must_use]
pub fn customer_request_fields() -> FieldMap<CustomerRequestField> {
    FieldMap::new()
        .status(CustomerRequestField::Status)
        .industry(CustomerRequestField::IndustryDomain)
        .category(
            CustomerRequestField::PrimaryUseCase,
            USE_CASES,
            Some(CustomerRequestField::PrimaryUseCaseType),
        )
        .primary_count(CustomerRequestField::DashboardsRequested)
        .secondary_count(CustomerRequestField::DashboardsDelivered)
        .search(CONTACT_SEARCH)
        .date(CustomerRequestField::CreatedAt)
}

/// Status filters on the derived `active`/`expired` state.
#[must_use]
pub fn demo_account_fields() -> FieldMap<DemoAccountField> {
    FieldMap::new()
        .status(DemoAccountField::State)
        .industry(DemoAccountField::IndustryDomain)
        .integration(DemoAccountField::SelectedIntegrations)
        .search([
            DemoAccountField::FirstName,
            DemoAccountField::LastName,
            DemoAccountField::Company,
            DemoAccountField::Email,
            DemoAccountField::Phone,
        ])
        .date(DemoAccountField::CreatedAt)
}

/// Status filters on specialization; counts are assigned and completed.
#[must_use]
pub fn intern_fields() -> FieldMap<InternField> {
    FieldMap::new()
        .status(InternField::Specialization)
        .integration(InternField::Integrations)
        .company(InternField::CustomerCompanies)
        .primary_count(InternField::AssignedCount)
        .secondary_count(InternField::CompletedCount)
        .search([InternField::Name, InternField::Email, InternField::Username])
        .date(InternField::CreatedAt)
}

fn completed(r: &CustomerRequest) -> bool {
    r.status.is_completed()
}

#[must_use]
pub fn admin_customer_metrics() -> Vec<MetricSpec<CustomerRequest>> {
    vec![
        MetricSpec::total("total_customers"),
        MetricSpec::count("active_records", |r: &CustomerRequest, _| !completed(r)),
        MetricSpec::count("completed", |r: &CustomerRequest, _| completed(r)),
        MetricSpec::ratio(
            "completion_rate",
            |r: &CustomerRequest, _| completed(r),
            |_: &CustomerRequest, _| true,
        ),
        MetricSpec::average(
            "avg_dashboards_delivered",
            |r: &CustomerRequest| Some(f64::from(r.dashboards_delivered.unwrap_or(0))),
            Rounding::Whole,
        ),
    ]
}

#[must_use]
pub fn admin_intern_metrics() -> Vec<MetricSpec<Intern>> {
    vec![
        MetricSpec::total("total_interns"),
        MetricSpec::count("ld_interns", |i: &Intern, _| {
            i.specialization == Specialization::Ld
        }),
        MetricSpec::count("demo_interns", |i: &Intern, _| {
            i.specialization == Specialization::Demo
        }),
        MetricSpec::average("avg_success_rate", |i: &Intern| i.success_rate, Rounding::Whole),
    ]
}

#[must_use]
pub fn demo_account_metrics() -> Vec<MetricSpec<DemoAccount>> {
    vec![
        MetricSpec::total("total_demo_accounts"),
        MetricSpec::count("active_demo_accounts", |d: &DemoAccount, now| {
            d.is_effectively_active(now)
        }),
        MetricSpec::count("expired_demo_accounts", |d: &DemoAccount, now| {
            !d.is_effectively_active(now)
        }),
        MetricSpec::ratio(
            "active_rate",
            |d: &DemoAccount, now| d.is_effectively_active(now),
            |_: &DemoAccount, _| true,
        ),
    ]
}

/// KPIs of an intern's own assignments.
#[must_use]
pub fn intern_request_metrics() -> Vec<MetricSpec<CustomerRequest>> {
    vec![
        MetricSpec::total("total_assigned"),
        MetricSpec::count("completed", |r: &CustomerRequest, _| completed(r)),
        MetricSpec::count("in_progress", |r: &CustomerRequest, _| {
            r.status.is_in_progress()
        }),
        MetricSpec::count("pending", |r: &CustomerRequest, _| {
            r.status == RequestStatus::Pending
        }),
        MetricSpec::ratio(
            "completion_rate",
            |r: &CustomerRequest, _| completed(r),
            |_: &CustomerRequest, _| true,
        ),
        MetricSpec::count("dashboards_pending", |r: &CustomerRequest, _| !completed(r)),
        MetricSpec::count("client_satisfied", |r: &CustomerRequest, _| {
            completed(r)
                && r
                    .customer_satisfaction_score
                    .is_some_and(|s| s >= SATISFIED_SCORE)
        }),
        MetricSpec::count("pilot_dashboards", |r: &CustomerRequest, _| r.is_pilot()),
        MetricSpec::count("pilot_completed", |r: &CustomerRequest, _| {
            r.is_pilot() && completed(r)
        }),
        // A zero score means "not rated yet".
        MetricSpec::average(
            "average_customer_score",
            |r: &CustomerRequest| r.customer_satisfaction_score.filter(|s| *s > 0.0),
            Rounding::Tenths,
        ),
    ]
}

#[must_use]
pub fn admin_customer_view(client: Arc<dyn PortalClientV1>) -> RecordCollectionView<CustomerRequest> {
    RecordCollectionView::new(
        Arc::new(AdminCustomerRequests::new(client)),
        customer_request_fields(),
        admin_customer_metrics(),
    )
}

#[must_use]
pub fn admin_demo_view(client: Arc<dyn PortalClientV1>) -> RecordCollectionView<DemoAccount> {
    RecordCollectionView::new(
        Arc::new(AdminDemoAccounts::new(client)),
        demo_account_fields(),
        demo_account_metrics(),
    )
}

#[must_use]
pub fn admin_intern_view(client: Arc<dyn PortalClientV1>) -> RecordCollectionView<Intern> {
    RecordCollectionView::new(
        Arc::new(AdminInterns::new(client)),
        intern_fields(),
        admin_intern_metrics(),
    )
}

#[must_use]
pub fn intern_request_view(
    client: Arc<dyn PortalClientV1>,
    intern_id: &str,
) -> RecordCollectionView<CustomerRequest> {
    RecordCollectionView::new(
        Arc::new(InternRequests::new(client, intern_id)),
        customer_request_fields(),
        intern_request_metrics(),
    )
}

#[must_use]
pub fn intern_demo_view(
    client: Arc<dyn PortalClientV1>,
    intern_id: &str,
) -> RecordCollectionView<DemoAccount> {
    RecordCollectionView::new(
        Arc::new(InternDemoAccounts::new(client, intern_id)),
        demo_account_fields(),
        demo_account_metrics(),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use ldp_query::{Dimension, FilterEngine, FilterState, aggregate};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn request(v: serde_json::Value) -> CustomerRequest {
        serde_json::from_value(v).unwrap()
    }

    fn requests() -> Vec<CustomerRequest> {
        vec![
            request(json!({"id": 1, "status": "completed", "customer_satisfaction_score": 9,
                           "project_type": "pilot", "dashboards_delivered": 4})),
            request(json!({"id": 2, "status": "completed", "customer_satisfaction_score": 6})),
            request(json!({"id": 3, "status": "in-progress", "project_type": "pilot",
                           "dashboards_delivered": 1})),
            request(json!({"id": 4, "status": "pending", "customer_satisfaction_score": 0})),
            request(json!({"id": 5, "status": "assigned"})),
        ]
    }

    #[test]
    fn admin_customer_kpis() {
        let stats = aggregate(&requests(), &admin_customer_metrics(), now());
        assert_eq!(stats.get("total_customers"), Some(5.0));
        assert_eq!(stats.get("active_records"), Some(3.0));
        assert_eq!(stats.get("completed"), Some(2.0));
        assert_eq!(stats.get("completion_rate"), Some(40.0));
        // (4 + 0 + 1 + 0 + 0) / 5 = 1
        assert_eq!(stats.get("avg_dashboards_delivered"), Some(1.0));
    }

    #[test]
    fn intern_request_kpis() {
        let stats = aggregate(&requests(), &intern_request_metrics(), now());
        assert_eq!(stats.get("total_assigned"), Some(5.0));
        assert_eq!(stats.get("in_progress"), Some(2.0));
        assert_eq!(stats.get("pending"), Some(1.0));
        assert_eq!(stats.get("dashboards_pending"), Some(3.0));
        assert_eq!(stats.get("client_satisfied"), Some(1.0));
        assert_eq!(stats.get("pilot_dashboards"), Some(2.0));
        assert_eq!(stats.get("pilot_completed"), Some(1.0));
        assert_eq!(stats.get("average_customer_score"), Some(7.5));
    }

    #[test]
    fn empty_collection_has_no_nan() {
        let stats = aggregate(&[], &intern_request_metrics(), now());
        assert!(stats.iter().all(|(_, v)| v.is_finite()));
        assert_eq!(stats.get("completion_rate"), Some(0.0));
        assert_eq!(stats.get("average_customer_score"), Some(0.0));
    }

    #[test]
    fn demo_kpis_use_the_clock() {
        let demos: Vec<DemoAccount> = vec![
            serde_json::from_value(json!({"id": 1, "is_active": 1,
                "expires_at": (now() + Duration::days(3)).to_rfc3339()})).unwrap(),
            serde_json::from_value(json!({"id": 2, "is_active": 1,
                "expires_at": (now() - Duration::days(1)).to_rfc3339()})).unwrap(),
            serde_json::from_value(json!({"id": 3, "is_active": 0})).unwrap(),
        ];
        let stats = aggregate(&demos, &demo_account_metrics(), now());
        assert_eq!(stats.get("active_demo_accounts"), Some(1.0));
        assert_eq!(stats.get("expired_demo_accounts"), Some(2.0));
        assert_eq!(stats.get("active_rate"), Some(33.0));

        let later = aggregate(&demos, &demo_account_metrics(), now() + Duration::days(4));
        assert_eq!(later.get("active_demo_accounts"), Some(0.0));
    }

    #[test]
    fn intern_kpis_and_filters() {
        let interns: Vec<Intern> = vec![
            serde_json::from_value(json!({"id": 1, "name": "Grace", "specialization": "L&D",
                "success_rate": 90, "customer_companies": ["Acme"], "assigned_count": 12})).unwrap(),
            serde_json::from_value(json!({"id": 2, "name": "Alan", "specialization": "Demo",
                "customer_companies": "[\"Globex\"]", "assigned_count": 2})).unwrap(),
            serde_json::from_value(json!({"id": 3, "name": "Ada", "specialization": "L&D",
                "success_rate": 75})).unwrap(),
        ];
        let stats = aggregate(&interns, &admin_intern_metrics(), now());
        assert_eq!(stats.get("ld_interns"), Some(2.0));
        assert_eq!(stats.get("demo_interns"), Some(1.0));
        assert_eq!(stats.get("avg_success_rate"), Some(83.0));

        let engine = FilterEngine::new(intern_fields());
        let state = FilterState::default()
            .with(Dimension::Company, "Globex")
            .unwrap();
        let hits = engine.apply(&interns, &state, now());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        let state = FilterState::default()
            .with(Dimension::PrimaryCount, "10+")
            .unwrap()
            .with(Dimension::Status, "L&D")
            .unwrap();
        let hits = engine.apply(&interns, &state, now());
        assert_eq!(hits.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn custom_use_case_filter() {
        let rows = vec![
            request(json!({"id": 1, "primary_use_case": USE_CASES[0]})),
            request(json!({"id": 2, "primary_use_case": "Track onboarding of remote hires"})),
            request(json!({"id": 3, "primary_use_case": USE_CASES[1],
                           "primary_use_case_type": "custom"})),
            request(json!({"id": 4})),
        ];
        let engine = FilterEngine::new(customer_request_fields());
        let state = FilterState::default()
            .with(Dimension::Category, "custom")
            .unwrap();
        let ids: Vec<i64> = engine.apply(&rows, &state, now()).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
