//! Demographic persistence: mailing, employment, finances and children.
//! A parent spans three tables; the insert keeps them in one transaction.

use sqlx::PgPool;

use crate::datagen::people::{Child, Parent};

/// Insert one parent across mailing, employment and finances.
pub async fn insert_parent(pool: &PgPool, parent: &Parent) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO mailing (parent_id, first_name, last_name, address, city, state, zip) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(parent.parent_id)
    .bind(&parent.first_name)
    .bind(&parent.last_name)
    .bind(&parent.address)
    .bind(&parent.city)
    .bind(&parent.state)
    .bind(parent.zip)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO employment (parent_id, job, salary, start_date) VALUES ($1, $2, $3, $4)",
    )
    .bind(parent.parent_id)
    .bind(&parent.job)
    .bind(parent.salary)
    .bind(parent.start_date)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO finances (parent_id, bank_act, savings) VALUES ($1, $2, $3)")
        .bind(parent.parent_id)
        .bind(&parent.bank_act)
        .bind(parent.savings)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Insert one child row.
pub async fn insert_child(pool: &PgPool, child: &Child) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO children (child_id, parent1_id, parent2_id, first_name, last_name, \
                               same_residence, is_student, is_employed) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(child.child_id)
    .bind(child.parent1_id)
    .bind(child.parent2_id)
    .bind(&child.first_name)
    .bind(&child.last_name)
    .bind(child.same_residence)
    .bind(child.is_student)
    .bind(child.is_employed)
    .execute(pool)
    .await?;
    Ok(())
}
