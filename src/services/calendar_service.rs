// src/services/calendar_service.rs

use crate::{
    common::error::AppError,
    db::EventRepository,
    models::{
        event::{CalendarEvent, CalendarQuery},
        tenancy::Tenant,
    },
};

/// Limite pedido -> limite efetivo, sempre entre 1 e o teto configurado.
pub fn effective_limit(requested: Option<i64>, max_events: i64) -> i64 {
    let max_events = max_events.max(1);
    requested.map_or(max_events, |limit| limit.clamp(1, max_events))
}

#[derive(Clone)]
pub struct CalendarService {
    event_repo: EventRepository,
    max_events: i64,
}

impl CalendarService {
    pub fn new(event_repo: EventRepository, max_events: i64) -> Self {
        Self { event_repo, max_events }
    }

    /// Só eventos APPROVED e PUBLIC, em ordem de início.
    /// Sem tenant (faculdade padrão ainda não criada) o calendário é vazio.
    pub async fn public_calendar(
        &self,
        tenant: Option<&Tenant>,
        query: &CalendarQuery,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let Some(tenant) = tenant else {
            tracing::debug!("📅 Tenant padrão ainda não existe: calendário vazio");
            return Ok(Vec::new());
        };

        let limit = effective_limit(query.limit, self.max_events);

        let rows = self
            .event_repo
            .list_public_calendar(tenant.id, query.from, query.to, limit)
            .await?;

        Ok(rows.into_iter().map(CalendarEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::fixtures,
        models::{
            auth::UserState,
            event::{EventStatus, EventVisibility},
            rbac::Role,
        },
    };
    use sqlx::PgPool;

    #[test]
    fn limit_defaults_to_the_configured_ceiling() {
        assert_eq!(effective_limit(None, 500), 500);
    }

    #[test]
    fn limit_is_clamped_into_range() {
        assert_eq!(effective_limit(Some(20), 500), 20);
        assert_eq!(effective_limit(Some(10_000), 500), 500);
        assert_eq!(effective_limit(Some(0), 500), 1);
        assert_eq!(effective_limit(Some(-3), 500), 1);
    }

    #[test]
    fn a_broken_ceiling_still_returns_something() {
        assert_eq!(effective_limit(None, 0), 1);
    }

    #[sqlx::test]
    async fn only_approved_public_events_reach_the_calendar(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());
        let tenant = state.tenant_service.default_tenant().await?;
        let creator =
            fixtures::user(&pool, tenant.id, "club@college.edu", Role::ClubMember, UserState::Active).await?;
        let room = fixtures::room(&pool, tenant.id, "Room 101").await?;

        use EventStatus::*;
        use EventVisibility::*;
        fixtures::event(&pool, &room, &creator, "Aberto", Public, Approved, 3).await?;
        fixtures::event(&pool, &room, &creator, "Fechado", Private, Approved, 1).await?;
        fixtures::event(&pool, &room, &creator, "Aguardando", Public, Pending, 2).await?;
        fixtures::event(&pool, &room, &creator, "Recusado", Public, Rejected, 4).await?;
        fixtures::event(&pool, &room, &creator, "Feira", Public, Approved, 5).await?;

        // Evento público aprovado de outra faculdade
        let other = fixtures::tenant(&pool, "outra", "Outra Faculdade").await?;
        let outsider =
            fixtures::user(&pool, other.id, "x@outra.edu", Role::ClubMember, UserState::Active).await?;
        let other_room = fixtures::room(&pool, other.id, "Sala X").await?;
        fixtures::event(&pool, &other_room, &outsider, "De fora", Public, Approved, 3).await?;

        let events = state
            .calendar_service
            .public_calendar(Some(&tenant), &CalendarQuery::default())
            .await?;

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Aberto", "Feira"]);
        assert_eq!(events[0].room.name, "Room 101");
        assert_eq!(events[0].creator.role, Role::ClubMember);

        let limited = state
            .calendar_service
            .public_calendar(Some(&tenant), &CalendarQuery { limit: Some(1), ..Default::default() })
            .await?;
        assert_eq!(limited.len(), 1);
        Ok(())
    }

    #[sqlx::test]
    async fn no_default_tenant_means_an_empty_calendar(pool: PgPool) -> anyhow::Result<()> {
        let state = fixtures::app_state(pool.clone());

        let tenant = state.tenant_service.find_default().await?;
        assert!(tenant.is_none());

        let events = state
            .calendar_service
            .public_calendar(tenant.as_ref(), &CalendarQuery::default())
            .await?;
        assert!(events.is_empty());

        let tenants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tenants").fetch_one(&pool).await?;
        assert_eq!(tenants, 0);
        Ok(())
    }
}
