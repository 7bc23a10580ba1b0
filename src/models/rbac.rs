// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

// --- Enum de Cargos (Mapeando o Postgres) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum Role {
    SuperAdmin,      // Dono do sistema
    OrgAdmin,        // TI / secretaria da faculdade
    DeptHod,         // Chefe de departamento
    DeptCoord,       // Coordenador de departamento
    ResourceManager,
    ClubMember,
}

impl Role {
    /// Todos os cargos, do mais alto para o mais baixo.
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::OrgAdmin,
        Role::DeptHod,
        Role::DeptCoord,
        Role::ResourceManager,
        Role::ClubMember,
    ];

    /// Posição fixa na hierarquia. Quanto maior, mais poder.
    pub const fn rank(self) -> u8 {
        match self {
            Role::SuperAdmin => 6,
            Role::OrgAdmin => 5,
            Role::DeptHod => 4,
            Role::DeptCoord => 3,
            Role::ResourceManager => 2,
            Role::ClubMember => 1,
        }
    }

    /// `true` se `self` está estritamente acima de `target`.
    /// Ninguém gerencia o próprio nível (nem o SUPER_ADMIN).
    pub const fn can_manage(self, target: Role) -> bool {
        self.rank() > target.rank()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::OrgAdmin => "ORG_ADMIN",
            Role::DeptHod => "DEPT_HOD",
            Role::DeptCoord => "DEPT_COORD",
            Role::ResourceManager => "RESOURCE_MANAGER",
            Role::ClubMember => "CLUB_MEMBER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Versão "texto" da checagem: cargo desconhecido em qualquer lado nunca gerencia.
pub fn can_manage_str(acting: &str, target: &str) -> bool {
    match (acting.parse::<Role>(), target.parse::<Role>()) {
        (Ok(acting), Ok(target)) => acting.can_manage(target),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_manage_matches_strict_rank_order_for_every_pair() {
        for acting in Role::ALL {
            for target in Role::ALL {
                assert_eq!(
                    acting.can_manage(target),
                    acting.rank() > target.rank(),
                    "{acting} -> {target}"
                );
            }
        }
    }

    #[test]
    fn super_admin_manages_everyone_but_itself() {
        for target in Role::ALL {
            assert_eq!(Role::SuperAdmin.can_manage(target), target != Role::SuperAdmin);
        }
    }

    #[test]
    fn club_member_manages_nobody() {
        assert!(Role::ALL.iter().all(|t| !Role::ClubMember.can_manage(*t)));
    }

    #[test]
    fn unknown_role_strings_never_manage() {
        assert!(can_manage_str("ORG_ADMIN", "CLUB_MEMBER"));
        assert!(!can_manage_str("JANITOR", "CLUB_MEMBER"));
        assert!(!can_manage_str("SUPER_ADMIN", "janitor"));
        assert!(!can_manage_str("org_admin", "CLUB_MEMBER"));
    }

    #[test]
    fn roles_use_screaming_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Role::ResourceManager).unwrap();
        assert_eq!(json, "\"RESOURCE_MANAGER\"");
        let back: Role = serde_json::from_str("\"DEPT_HOD\"").unwrap();
        assert_eq!(back, Role::DeptHod);
    }
}
