use super::models::{compute_progress, LearningPlan, LearningPlanDraft, LearningPlanTopic};
use super::plan_store::LearningPlanStore;
use crate::store::{row_id, Page, Paged, SqlitePlatformStore};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PLAN_COLUMNS: &str =
    "id, user_id, title, description, start_date, end_date, progress, created, updated";

fn plan_from_row(row: &Row) -> rusqlite::Result<LearningPlan> {
    Ok(LearningPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        progress: row.get(6)?,
        topics: vec![],
        created: row.get(7)?,
        updated: row.get(8)?,
    })
}

fn load_topics(conn: &Connection, plan_id: usize) -> Result<Vec<LearningPlanTopic>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description, resources, position, completed
         FROM learning_plan_topic WHERE plan_id = ?1 ORDER BY position ASC, id ASC",
    )?;
    let topics = stmt
        .query_map(params![plan_id], |row| {
            Ok(LearningPlanTopic {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                resources: row.get(3)?,
                position: row.get(4)?,
                completed: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(topics)
}

fn load_plan(conn: &Connection, plan_id: usize) -> Result<Option<LearningPlan>> {
    let plan = conn
        .query_row(
            &format!("SELECT {} FROM learning_plan WHERE id = ?1", PLAN_COLUMNS),
            params![plan_id],
            plan_from_row,
        )
        .optional()?;
    match plan {
        Some(mut plan) => {
            plan.topics = load_topics(conn, plan.id)?;
            Ok(Some(plan))
        }
        None => Ok(None),
    }
}

fn insert_topics(conn: &Connection, plan_id: usize, draft: &LearningPlanDraft) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO learning_plan_topic (plan_id, name, description, resources, position, completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (position, topic) in draft.topics.iter().enumerate() {
        stmt.execute(params![
            plan_id,
            topic.name,
            topic.description,
            topic.resources,
            position,
            topic.completed
        ])
        .with_context(|| format!("Failed to insert topic for plan {}", plan_id))?;
    }
    Ok(())
}

fn with_topics(conn: &Connection, plans: Vec<LearningPlan>) -> Result<Vec<LearningPlan>> {
    plans
        .into_iter()
        .map(|mut plan| -> Result<LearningPlan> {
            plan.topics = load_topics(conn, plan.id)?;
            Ok(plan)
        })
        .collect()
}

impl LearningPlanStore for SqlitePlatformStore {
    fn insert_plan(
        &self,
        user_id: usize,
        draft: &LearningPlanDraft,
        progress: u8,
        created: i64,
    ) -> Result<LearningPlan> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO learning_plan (user_id, title, description, start_date, end_date, progress, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                draft.title,
                draft.description,
                draft.start_date,
                draft.end_date,
                progress,
                created
            ],
        )
        .with_context(|| format!("Failed to insert learning plan for user {}", user_id))?;
        let plan_id = tx.last_insert_rowid() as usize;
        insert_topics(&tx, plan_id, draft)?;
        let plan = load_plan(&tx, plan_id)?.context("Inserted plan vanished")?;

        tx.commit()?;
        Ok(plan)
    }

    fn get_plan(&self, plan_id: usize) -> Result<Option<LearningPlan>> {
        if row_id(plan_id).is_none() {
            return Ok(None);
        }
        let conn = self.conn.lock().unwrap();
        load_plan(&conn, plan_id)
    }

    fn replace_plan(
        &self,
        plan_id: usize,
        draft: &LearningPlanDraft,
        progress: u8,
        updated: i64,
    ) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE learning_plan
             SET title = ?1, description = ?2, start_date = ?3, end_date = ?4, progress = ?5, updated = ?6
             WHERE id = ?7",
            params![
                draft.title,
                draft.description,
                draft.start_date,
                draft.end_date,
                progress,
                updated,
                plan_id
            ],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        tx.execute(
            "DELETE FROM learning_plan_topic WHERE plan_id = ?1",
            params![plan_id],
        )?;
        insert_topics(&tx, plan_id, draft)?;

        tx.commit()?;
        Ok(true)
    }

    fn set_topic_completed(
        &self,
        plan_id: usize,
        topic_id: usize,
        completed: bool,
        updated: i64,
    ) -> Result<Option<LearningPlan>> {
        if row_id(plan_id).is_none() || row_id(topic_id).is_none() {
            return Ok(None);
        }
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE learning_plan_topic SET completed = ?1 WHERE id = ?2 AND plan_id = ?3",
            params![completed, topic_id, plan_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let (done, total): (usize, usize) = tx.query_row(
            "SELECT COALESCE(SUM(completed), 0), COUNT(*) FROM learning_plan_topic WHERE plan_id = ?1",
            params![plan_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        tx.execute(
            "UPDATE learning_plan SET progress = ?1, updated = ?2 WHERE id = ?3",
            params![compute_progress(done, total), updated, plan_id],
        )?;
        let plan = load_plan(&tx, plan_id)?;

        tx.commit()?;
        Ok(plan)
    }

    fn delete_plan(&self, plan_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM learning_plan WHERE id = ?1", params![plan_id])?;
        Ok(deleted > 0)
    }

    fn list_user_plans(&self, user_id: usize) -> Result<Vec<LearningPlan>> {
        let conn = self.conn.lock().unwrap();
        let plans = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM learning_plan WHERE user_id = ?1 ORDER BY created DESC, id DESC",
                PLAN_COLUMNS
            ))?;
            let plans = stmt
                .query_map(params![user_id], plan_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            plans
        };
        with_topics(&conn, plans)
    }

    fn list_plans(&self, page: Page) -> Result<Paged<LearningPlan>> {
        let conn = self.conn.lock().unwrap();
        let total: usize =
            conn.query_row("SELECT COUNT(*) FROM learning_plan", [], |row| row.get(0))?;
        let plans = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM learning_plan ORDER BY created DESC, id DESC LIMIT ?1 OFFSET ?2",
                PLAN_COLUMNS
            ))?;
            let plans = stmt
                .query_map(params![page.size, page.offset()], plan_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            plans
        };
        Ok(Paged::new(with_topics(&conn, plans)?, page, total))
    }

    fn search_plans(&self, query: &str, page: Page) -> Result<Paged<LearningPlan>> {
        let conn = self.conn.lock().unwrap();
        let total: usize = conn.query_row(
            "SELECT COUNT(*) FROM learning_plan WHERE instr(lower(title), lower(?1)) > 0",
            params![query],
            |row| row.get(0),
        )?;
        let plans = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM learning_plan WHERE instr(lower(title), lower(?1)) > 0
                 ORDER BY created DESC, id DESC LIMIT ?2 OFFSET ?3",
                PLAN_COLUMNS
            ))?;
            let plans = stmt
                .query_map(params![query, page.size, page.offset()], plan_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            plans
        };
        Ok(Paged::new(with_topics(&conn, plans)?, page, total))
    }
}
