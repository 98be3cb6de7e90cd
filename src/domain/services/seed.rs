use serde_json::json;
use tracing::{info, warn};

use crate::domain::models::permissions::Permissions;
use crate::domain::models::role::{Profile, Role};
use crate::domain::models::user::{NewUserParams, User};
use crate::domain::services::auth_service::hash_password;
use crate::error::AppError;
use crate::state::AppState;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_ROLE: &str = "Administrador";
pub const ADMIN_PROFILE: &str = "Administrador del Sistema";
const FALLBACK_ADMIN_PASSWORD: &str = "admin123";

// (nombre, descripcion, nivel_acceso, color, icono)
const DEFAULT_ROLES: &[(&str, &str, i32, &str, &str)] = &[
    ("Super Administrador", "Control total del sistema", 10, "#d32f2f", "admin_panel_settings"),
    ("Administrador", "Administración del sistema", 8, "#f57c00", "security"),
    ("Gerente", "Gestión de áreas y personal", 7, "#7b1fa2", "supervisor_account"),
    ("Supervisor", "Supervisión de áreas", 6, "#1976d2", "manage_accounts"),
    ("Coordinador", "Coordinación de actividades", 5, "#388e3c", "group"),
    ("Usuario Avanzado", "Acceso extendido", 4, "#ff9800", "person_add"),
    ("Usuario Estándar", "Acceso básico", 3, "#2196f3", "person"),
    ("Usuario Limitado", "Acceso restringido", 2, "#9e9e9e", "person_outline"),
    ("Invitado", "Acceso temporal", 1, "#757575", "person_off"),
    ("Auditor", "Solo lectura", 2, "#607d8b", "assessment"),
];

fn default_profiles() -> Vec<Profile> {
    let rw = json!({ "read": true, "write": true });
    let ro = json!({ "read": true });
    let catalog = vec![
        (
            "Super Administrador del Sistema",
            "Control total del sistema",
            json!({ "all": true }),
            5,
            "#d32f2f",
            "admin_panel_settings",
        ),
        (
            ADMIN_PROFILE,
            "Administración completa",
            json!({ "users": true, "residentes": true, "visitas": true, "visitas_externas": true }),
            4,
            "#f57c00",
            "security",
        ),
        (
            "Gerente de Seguridad",
            "Gestión de seguridad",
            json!({ "users": rw, "residentes": true, "visitas": true, "visitas_externas": true }),
            4,
            "#7b1fa2",
            "supervisor_account",
        ),
        (
            "Supervisor de Área",
            "Supervisión de áreas",
            json!({ "users": ro, "residentes": ro, "visitas": true, "visitas_externas": true }),
            3,
            "#1976d2",
            "manage_accounts",
        ),
        (
            "Coordinador de Accesos",
            "Coordinación de accesos",
            json!({ "users": ro, "residentes": ro, "visitas": rw, "visitas_externas": rw }),
            3,
            "#388e3c",
            "group",
        ),
        (
            "Usuario Avanzado",
            "Acceso extendido",
            json!({ "residentes": ro, "visitas": rw, "visitas_externas": rw }),
            2,
            "#ff9800",
            "person_add",
        ),
        (
            "Usuario Estándar",
            "Acceso básico",
            json!({ "residentes": ro, "visitas": rw }),
            2,
            "#2196f3",
            "person",
        ),
        ("Usuario Limitado", "Acceso restringido", json!({ "visitas": ro }), 1, "#9e9e9e", "person_outline"),
        ("Invitado Temporal", "Acceso temporal", json!({}), 1, "#757575", "person_off"),
        (
            "Auditor del Sistema",
            "Solo lectura",
            json!({ "users": ro, "residentes": ro, "visitas": ro, "visitas_externas": ro }),
            2,
            "#607d8b",
            "assessment",
        ),
    ];

    catalog
        .into_iter()
        .map(|(nombre, descripcion, permisos, nivel, color, icono)| {
            Profile::new(nombre, descripcion, Permissions::from_value(permisos), nivel, color, icono)
        })
        .collect()
}

/// Creates missing default roles and profiles and the `admin` account.
/// Safe to run on every start.
pub async fn seed_defaults(state: &AppState) -> Result<(), AppError> {
    for (nombre, descripcion, nivel, color, icono) in DEFAULT_ROLES {
        if state.role_repo.find_by_name(nombre).await?.is_none() {
            state.role_repo.create(&Role::new(nombre, descripcion, *nivel, color, icono)).await?;
            info!("Seeded role '{}'", nombre);
        }
    }

    for profile in default_profiles() {
        if state.profile_repo.find_by_name(&profile.nombre).await?.is_none() {
            state.profile_repo.create(&profile).await?;
            info!("Seeded profile '{}'", profile.nombre);
        }
    }

    // A deactivated admin still counts; it is never silently recreated.
    if state.user_repo.username_exists(ADMIN_USERNAME).await? {
        return Ok(());
    }

    let role = state
        .role_repo
        .find_by_name(ADMIN_ROLE)
        .await?
        .ok_or_else(|| AppError::InternalWithMsg(format!("default role '{ADMIN_ROLE}' missing after seeding")))?;
    let profile = state
        .profile_repo
        .find_by_name(ADMIN_PROFILE)
        .await?
        .ok_or_else(|| AppError::InternalWithMsg(format!("default profile '{ADMIN_PROFILE}' missing after seeding")))?;

    let password = match &state.config.admin_password {
        Some(password) => password.clone(),
        None => {
            warn!("ADMIN_PASSWORD not set, seeding '{}' with the default password. Change it now.", ADMIN_USERNAME);
            FALLBACK_ADMIN_PASSWORD.to_string()
        }
    };

    let admin = User::new(NewUserParams {
        nombre: "Administrador".into(),
        apellido: "Sistema".into(),
        email: "admin@controlacceso.com".into(),
        username: ADMIN_USERNAME.into(),
        password_hash: hash_password(&password)?,
        rol_id: role.id,
        perfil_id: profile.id,
        telefono: None,
        direccion: None,
        created_by: None,
    });
    state.user_repo.create(&admin).await?;
    info!("Seeded administrator account '{}'", ADMIN_USERNAME);
    Ok(())
}
