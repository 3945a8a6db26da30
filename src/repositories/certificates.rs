use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;

use crate::db::models::Certificate;

const COLUMNS: &str = "id, student_id, course_id, description, student_photo, company_logo, issued_date";

pub(crate) struct CreateCertificate<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) description: &'a str,
    pub(crate) student_photo: &'a str,
    pub(crate) company_logo: &'a str,
    pub(crate) issued_date: Date,
}

/// One certificate per student; a second one trips `certificates_student_id_key`.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCertificate<'_>,
) -> Result<Certificate, sqlx::Error> {
    sqlx::query_as::<_, Certificate>(&format!(
        "INSERT INTO certificates (
            id, student_id, course_id, description, student_photo, company_logo, issued_date
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.description)
    .bind(params.student_photo)
    .bind(params.company_logo)
    .bind(params.issued_date)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Option<Certificate>, sqlx::Error> {
    sqlx::query_as::<_, Certificate>(&format!(
        "SELECT {COLUMNS} FROM certificates WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct CertificateFilter {
    pub(crate) issued_date: Option<Date>,
    pub(crate) search: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CertificateListRow {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_username: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) issued_date: Date,
}

/// Admin listing; search matches the student's username or the course title.
pub(crate) async fn list_admin(
    pool: &PgPool,
    filter: &CertificateFilter,
    skip: i64,
    limit: i64,
) -> Result<(Vec<CertificateListRow>, i64), sqlx::Error> {
    const FROM: &str = " FROM certificates ce
         JOIN students s ON s.id = ce.student_id
         JOIN users u ON u.id = s.user_id
         JOIN courses c ON c.id = ce.course_id
         WHERE 1=1";

    let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){FROM}"));
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT ce.id, ce.student_id, u.username AS student_username,
                ce.course_id, c.title AS course_title, ce.issued_date{FROM}"
    ));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY ce.issued_date DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    let rows = builder.build_query_as::<CertificateListRow>().fetch_all(pool).await?;
    Ok((rows, total))
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CertificateFilter) {
    if let Some(issued_date) = filter.issued_date {
        builder.push(" AND ce.issued_date = ");
        builder.push_bind(issued_date);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        builder.push(" AND (u.username ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR c.title ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}
