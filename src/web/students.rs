//! Admin student roll: CRUD, bulk import, code generation and reset

use crate::codes::{self, IMPORT_BATCH_SIZE, MAX_GENERATED_CODES};
use crate::db::get_db_pool;
use crate::orm::students;
use crate::web::admin::{header_admin_code, require_admin, AdminBody};
use crate::web::error::{row_error_reason, ApiError};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
};
use serde::Deserialize;
use std::collections::HashMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_students)
        .service(create_student)
        .service(update_student)
        .service(delete_student)
        .service(import_students)
        .service(generate_codes)
        .service(reset_codes);
}

/// Current maximum list number per (grade, course) group.
async fn group_maxima(db: &DatabaseConnection) -> Result<HashMap<(i32, i32), i32>, DbErr> {
    let students = students::Entity::find().all(db).await?;
    let mut maxima = HashMap::new();
    for s in &students {
        let entry = maxima.entry((s.grade, s.course)).or_insert(0);
        if s.list_number > *entry {
            *entry = s.list_number;
        }
    }
    Ok(maxima)
}

fn new_student_row(
    full_name: String,
    grade: i32,
    course: i32,
    list_number: i32,
    access_code: String,
) -> students::ActiveModel {
    students::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        full_name: Set(full_name),
        grade: Set(grade),
        course: Set(course),
        list_number: Set(list_number),
        access_code: Set(access_code),
        has_voted: Set(false),
        voted_at: Set(None),
        created_at: Set(Utc::now().naive_utc()),
    }
}

/// Roll order: grade, then course, then list number.
#[get("/api/admin/students")]
async fn list_students(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    require_admin(db, header_admin_code(&req).as_deref()).await?;

    let students = students::Entity::find()
        .order_by_asc(students::Column::Grade)
        .order_by_asc(students::Column::Course)
        .order_by_asc(students::Column::ListNumber)
        .all(db)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "students": students })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateStudentRequest {
    #[serde(default)]
    admin_code: Option<String>,
    full_name: String,
    grade: i32,
    course: i32,
    /// Defaults to the next position in the (grade, course) group.
    #[serde(default)]
    list_number: Option<i32>,
    /// Defaults to the code derived from grade/course/list_number.
    #[serde(default)]
    access_code: Option<String>,
}

#[post("/api/admin/students")]
async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let full_name = body.full_name.trim().to_string();
    if full_name.is_empty() || body.grade < 1 || body.course < 0 {
        return Err(ApiError::Validation(
            "full_name, grade and course are required".to_string(),
        ));
    }

    let list_number = match body.list_number {
        Some(n) if n >= 1 => n,
        Some(_) => {
            return Err(ApiError::Validation(
                "list_number must be positive".to_string(),
            ))
        }
        None => {
            let maxima = group_maxima(db).await?;
            maxima
                .get(&(body.grade, body.course))
                .copied()
                .unwrap_or(0)
                + 1
        }
    };

    let access_code = match &body.access_code {
        Some(code) if !code.trim().is_empty() => code.trim().to_string(),
        _ => codes::access_code(body.grade, body.course, list_number),
    };

    let student = new_student_row(full_name, body.grade, body.course, list_number, access_code)
        .insert(db)
        .await
        .map_err(|e| {
            if row_error_reason(&e) == "duplicate access code" {
                ApiError::Conflict("Access code already exists".to_string())
            } else {
                ApiError::from(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "student": student,
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StudentUpdates {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    grade: Option<i32>,
    #[serde(default)]
    course: Option<i32>,
    #[serde(default)]
    list_number: Option<i32>,
    #[serde(default)]
    access_code: Option<String>,
    #[serde(default)]
    has_voted: Option<bool>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateStudentRequest {
    #[serde(default)]
    admin_code: Option<String>,
    id: String,
    updates: StudentUpdates,
}

#[put("/api/admin/students")]
async fn update_student(
    req: HttpRequest,
    body: web::Json<UpdateStudentRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let student = students::Entity::find_by_id(body.id.clone())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    let mut row: students::ActiveModel = student.into();
    if let Some(name) = &body.updates.full_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "full_name must not be empty".to_string(),
            ));
        }
        row.full_name = Set(name.to_string());
    }
    if let Some(grade) = body.updates.grade {
        row.grade = Set(grade);
    }
    if let Some(course) = body.updates.course {
        row.course = Set(course);
    }
    if let Some(list_number) = body.updates.list_number {
        row.list_number = Set(list_number);
    }
    if let Some(code) = &body.updates.access_code {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::Validation(
                "access_code must not be empty".to_string(),
            ));
        }
        row.access_code = Set(code.to_string());
    }
    if let Some(has_voted) = body.updates.has_voted {
        row.has_voted = Set(has_voted);
        if !has_voted {
            row.voted_at = Set(None);
        }
    }
    row.update(db).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteStudentRequest {
    #[serde(default)]
    admin_code: Option<String>,
    id: String,
}

#[delete("/api/admin/students")]
async fn delete_student(
    req: HttpRequest,
    body: web::Json<DeleteStudentRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let deleted = students::Entity::delete_many()
        .filter(students::Column::Id.eq(body.id.clone()))
        .exec(db)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawImportRow {
    full_name: String,
    grade: i32,
    course: i32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportRequest {
    #[serde(default)]
    admin_code: Option<String>,
    students: Vec<RawImportRow>,
}

/// Bulk import. Rows are grouped by (grade, course), numbered
/// sequentially after each group's current maximum, and inserted in
/// batches; a failed batch retries row by row so one duplicate does not
/// sink the rest. Per-row failures come back as a list.
#[post("/api/admin/import")]
async fn import_students(
    req: HttpRequest,
    body: web::Json<ImportRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let ImportRequest {
        admin_code,
        students: raw_rows,
    } = body.into_inner();
    let supplied = header_admin_code(&req).or(admin_code);
    require_admin(db, supplied.as_deref()).await?;

    if raw_rows.is_empty() {
        return Err(ApiError::Validation("No students to import".to_string()));
    }

    let mut errors: Vec<String> = Vec::new();
    let mut valid: Vec<codes::ImportRow> = Vec::new();
    for (i, row) in raw_rows.into_iter().enumerate() {
        let full_name = row.full_name.trim().to_string();
        if full_name.is_empty() || row.grade < 1 || row.course < 0 {
            errors.push(format!("row {}: missing or invalid data", i + 1));
            continue;
        }
        valid.push(codes::ImportRow {
            full_name,
            grade: row.grade,
            course: row.course,
        });
    }

    if valid.is_empty() {
        return Err(ApiError::Validation(
            "No valid students to import".to_string(),
        ));
    }

    let total = valid.len();
    let maxima = group_maxima(db).await?;
    let numbered = codes::assign_list_numbers(valid, &maxima);

    let mut imported = 0usize;
    for batch in numbered.chunks(IMPORT_BATCH_SIZE) {
        let rows: Vec<students::ActiveModel> = batch
            .iter()
            .map(|r| {
                new_student_row(
                    r.full_name.clone(),
                    r.grade,
                    r.course,
                    r.list_number,
                    r.access_code.clone(),
                )
            })
            .collect();

        match students::Entity::insert_many(rows).exec(db).await {
            Ok(_) => imported += batch.len(),
            Err(batch_err) => {
                log::debug!("Batch insert failed, retrying per row: {}", batch_err);
                for r in batch {
                    let row = new_student_row(
                        r.full_name.clone(),
                        r.grade,
                        r.course,
                        r.list_number,
                        r.access_code.clone(),
                    );
                    match row.insert(db).await {
                        Ok(_) => imported += 1,
                        Err(e) => {
                            errors.push(format!("{}: {}", r.full_name, row_error_reason(&e)))
                        }
                    }
                }
            }
        }
    }

    let mut response = serde_json::json!({
        "success": true,
        "imported": imported,
        "total": total,
    });
    if !errors.is_empty() {
        response["errors"] = serde_json::json!(errors);
    }

    Ok(HttpResponse::Ok().json(response))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GenerateCodesRequest {
    #[serde(default)]
    admin_code: Option<String>,
    grade: i32,
    course: i32,
    count: i32,
}

/// Create `count` placeholder students in one group, continuing after
/// the group's highest list number (or highest code suffix, whichever is
/// larger, so regenerated groups never collide with hand-edited codes).
#[post("/api/admin/generate-codes")]
async fn generate_codes(
    req: HttpRequest,
    body: web::Json<GenerateCodesRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    if body.grade < 1 || body.course < 0 || body.count < 1 || body.count > MAX_GENERATED_CODES {
        return Err(ApiError::Validation(format!(
            "grade, course and count (1-{}) are required",
            MAX_GENERATED_CODES
        )));
    }

    let existing = students::Entity::find()
        .filter(students::Column::Grade.eq(body.grade))
        .filter(students::Column::Course.eq(body.course))
        .all(db)
        .await?;

    let prefix = format!("{}{}", body.grade, body.course);
    let mut max_list = 0;
    for s in &existing {
        if s.list_number > max_list {
            max_list = s.list_number;
        }
        if let Some(rest) = s.access_code.strip_prefix(&prefix) {
            if let Ok(n) = rest.parse::<i32>() {
                if n > max_list {
                    max_list = n;
                }
            }
        }
    }

    let mut created = Vec::with_capacity(body.count as usize);
    for i in 1..=body.count {
        let list_number = max_list + i;
        let access_code = codes::access_code(body.grade, body.course, list_number);
        let student = new_student_row(
            format!("Estudiante {}", access_code),
            body.grade,
            body.course,
            list_number,
            access_code,
        )
        .insert(db)
        .await?;
        created.push(student);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "students": created,
    })))
}

/// Recompute every student's access code from its current
/// (grade, course, list_number). Rows whose recomputed code collides
/// with an existing one fail individually and are skipped.
#[post("/api/admin/reset-codes")]
async fn reset_codes(
    req: HttpRequest,
    body: web::Json<AdminBody>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let students = students::Entity::find().all(db).await?;

    let mut updated = 0usize;
    let mut skipped = 0usize;
    for student in students {
        let new_code = codes::access_code(student.grade, student.course, student.list_number);
        if new_code == student.access_code {
            continue;
        }

        let row = students::ActiveModel {
            id: Set(student.id.clone()),
            access_code: Set(new_code),
            ..Default::default()
        };
        match row.update(db).await {
            Ok(_) => updated += 1,
            Err(e) => {
                log::warn!(
                    "Could not reset code for student {}: {}",
                    student.id,
                    row_error_reason(&e)
                );
                skipped += 1;
            }
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "updated": updated,
        "skipped": skipped,
        "message": format!("{} codes regenerated", updated),
    })))
}
