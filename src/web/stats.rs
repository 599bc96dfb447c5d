//! Admin statistics: turnout, per-group participation, candidate results

use crate::db::get_db_pool;
use crate::orm::{candidates, students};
use crate::web::admin::{header_admin_code, require_admin};
use crate::web::error::ApiError;
use actix_web::{get, HttpRequest, HttpResponse};
use sea_orm::{entity::*, query::*, EntityTrait};
use serde::Serialize;
use std::collections::BTreeMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(stats);
}

/// Percentage of voters, rounded to the nearest integer. Zero students
/// means zero percent, not a division fault.
fn participation_pct(voted: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    ((voted as f64 / total as f64) * 100.0).round() as i64
}

#[derive(Serialize)]
struct GroupParticipation {
    grade: i32,
    course: i32,
    total: usize,
    voted: usize,
    participation: i64,
}

/// Multiple candidates sharing a positive maximum is a tie.
fn is_tie(tallies: &[candidates::Model]) -> bool {
    let max = tallies.iter().map(|c| c.votes).max().unwrap_or(0);
    max > 0 && tallies.iter().filter(|c| c.votes == max).count() > 1
}

#[get("/api/stats")]
async fn stats(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    require_admin(db, header_admin_code(&req).as_deref()).await?;

    let students = students::Entity::find().all(db).await?;
    let total_students = students.len();
    let total_voted = students.iter().filter(|s| s.has_voted).count();

    // (grade, course) -> (total, voted); BTreeMap keeps group order.
    let mut groups: BTreeMap<(i32, i32), (usize, usize)> = BTreeMap::new();
    for s in &students {
        let entry = groups.entry((s.grade, s.course)).or_insert((0, 0));
        entry.0 += 1;
        if s.has_voted {
            entry.1 += 1;
        }
    }
    let by_grade: Vec<GroupParticipation> = groups
        .into_iter()
        .map(|((grade, course), (total, voted))| GroupParticipation {
            grade,
            course,
            total,
            voted,
            participation: participation_pct(voted, total),
        })
        .collect();

    let results = candidates::Entity::find()
        .order_by_desc(candidates::Column::Votes)
        .order_by_asc(candidates::Column::Name)
        .all(db)
        .await?;

    let total_votes: i64 = results.iter().map(|c| c.votes as i64).sum();
    let tie = is_tie(&results);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "general": {
            "totalStudents": total_students,
            "totalVoted": total_voted,
            "totalVotes": total_votes,
            "participation": participation_pct(total_voted, total_students),
        },
        "byGrade": by_grade,
        "results": results,
        "isTie": tie,
    })))
}
