use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::company_dto::{ChartResponse, ChartSeries, ChartSummary, HiringSeries};
use crate::error::Result;
use crate::models::application::ApplicationStatus;
use crate::utils::time;

const MONTH_BUCKETS: usize = 6;
const WEEK_BUCKETS: usize = 6;

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Company dashboard charts: all matching rows are fetched and
    /// bucketed in memory with fixed-width date arithmetic.
    pub async fn chart_data(&self, company_id: Uuid) -> Result<ChartResponse> {
        let applications = sqlx::query_as::<_, (DateTime<Utc>, ApplicationStatus)>(
            "SELECT applied_at, status FROM applications WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let views = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT viewed_at FROM profile_views WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let interviews_scheduled = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM interviews WHERE company_id = $1 AND status = 'SCHEDULED'",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(build_chart_data(
            time::now(),
            &applications,
            &views,
            interviews_scheduled,
        ))
    }
}

pub fn empty_chart_data(now: DateTime<Utc>) -> ChartResponse {
    build_chart_data(now, &[], &[], 0)
}

fn build_chart_data(
    now: DateTime<Utc>,
    applications: &[(DateTime<Utc>, ApplicationStatus)],
    views: &[DateTime<Utc>],
    interviews_scheduled: i64,
) -> ChartResponse {
    let month_labels: Vec<String> = (0..MONTH_BUCKETS)
        .rev()
        .map(|offset| time::month_label(now, offset as i32))
        .collect();

    let mut applications_by_month = vec![0i64; MONTH_BUCKETS];
    let mut hired_by_month = vec![0i64; MONTH_BUCKETS];
    let mut interviewing_by_month = vec![0i64; MONTH_BUCKETS];

    let mut total_applications = 0i64;
    let mut pending_reviews = 0i64;
    let mut offers_extended = 0i64;

    for (applied_at, status) in applications {
        total_applications += 1;
        match status {
            ApplicationStatus::Applied | ApplicationStatus::Reviewing => pending_reviews += 1,
            ApplicationStatus::Offered => offers_extended += 1,
            _ => {}
        }

        let months_back = time::months_between(*applied_at, now);
        if (0..MONTH_BUCKETS as i32).contains(&months_back) {
            let index = MONTH_BUCKETS - 1 - months_back as usize;
            applications_by_month[index] += 1;
            match status {
                ApplicationStatus::Hired => hired_by_month[index] += 1,
                ApplicationStatus::Interviewing => interviewing_by_month[index] += 1,
                _ => {}
            }
        }
    }

    // Trailing 7-day windows, oldest first.
    let mut views_by_week = vec![0i64; WEEK_BUCKETS];
    for viewed_at in views {
        let days_back = (now - *viewed_at).num_days();
        if days_back >= 0 {
            let weeks_back = (days_back / 7) as usize;
            if weeks_back < WEEK_BUCKETS {
                views_by_week[WEEK_BUCKETS - 1 - weeks_back] += 1;
            }
        }
    }
    let week_labels: Vec<String> = (1..=WEEK_BUCKETS)
        .map(|n| format!("Week {}", n))
        .collect();

    ChartResponse {
        application_data: ChartSeries {
            labels: month_labels.clone(),
            data: applications_by_month,
        },
        hiring_data: HiringSeries {
            labels: month_labels,
            hired: hired_by_month,
            interviewing: interviewing_by_month,
        },
        visitor_data: ChartSeries {
            labels: week_labels,
            data: views_by_week,
        },
        summary: ChartSummary {
            total_applications,
            interviews_scheduled,
            pending_reviews,
            offers_extended,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(now: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
        now - Duration::days(days_back)
    }

    #[test]
    fn empty_chart_has_six_zeroed_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let chart = empty_chart_data(now);
        assert_eq!(chart.application_data.labels.len(), 6);
        assert_eq!(chart.application_data.data, vec![0; 6]);
        assert_eq!(chart.visitor_data.data, vec![0; 6]);
        assert_eq!(chart.summary.total_applications, 0);
    }

    #[test]
    fn monthly_labels_end_at_the_current_month() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let chart = empty_chart_data(now);
        assert_eq!(
            chart.application_data.labels,
            vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]
        );
    }

    #[test]
    fn applications_land_in_their_calendar_month() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let applications = vec![
            (now, ApplicationStatus::Applied),
            (at(now, 40), ApplicationStatus::Hired),        // May
            (at(now, 40), ApplicationStatus::Interviewing), // May
            (at(now, 400), ApplicationStatus::Applied),     // outside the window
        ];
        let chart = build_chart_data(now, &applications, &[], 0);

        assert_eq!(chart.application_data.data, vec![0, 0, 0, 0, 2, 1]);
        assert_eq!(chart.hiring_data.hired, vec![0, 0, 0, 0, 1, 0]);
        assert_eq!(chart.hiring_data.interviewing, vec![0, 0, 0, 0, 1, 0]);
        // Totals still count rows outside the chart window.
        assert_eq!(chart.summary.total_applications, 4);
    }

    #[test]
    fn a_year_old_same_month_application_is_not_bucketed() {
        // The calendar-month delta keeps last June out of this June's bucket.
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let last_june = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let chart = build_chart_data(now, &[(last_june, ApplicationStatus::Applied)], &[], 0);
        assert_eq!(chart.application_data.data, vec![0; 6]);
    }

    #[test]
    fn views_bucket_into_trailing_weeks() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let views = vec![at(now, 0), at(now, 3), at(now, 10), at(now, 50)];
        let chart = build_chart_data(now, &[], &views, 0);
        // 0 and 3 days back -> newest window; 10 days -> one back; 50 days -> dropped.
        assert_eq!(chart.visitor_data.data, vec![0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn summary_counts_by_status() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let applications = vec![
            (now, ApplicationStatus::Applied),
            (now, ApplicationStatus::Reviewing),
            (now, ApplicationStatus::Offered),
            (now, ApplicationStatus::Rejected),
        ];
        let chart = build_chart_data(now, &applications, &[], 2);
        assert_eq!(chart.summary.pending_reviews, 2);
        assert_eq!(chart.summary.offers_extended, 1);
        assert_eq!(chart.summary.interviews_scheduled, 2);
    }
}
