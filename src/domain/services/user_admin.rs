use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::models::pagination::Page;
use crate::domain::models::role::{Profile, Role};
use crate::domain::models::user::{NewUserParams, User, UserDraft, UserFilter, UserPatch, UserStatus};
use crate::domain::ports::{ProfileRepository, RoleRepository, UserRepository};
use crate::domain::services::auth_service::hash_password;
use crate::error::{AppError, FieldError};

const NOT_FOUND: &str = "Usuario no encontrado";

/// A user together with the role and profile it references.
#[derive(Debug, Clone)]
pub struct UserDetails {
    pub user: User,
    pub role: Option<Role>,
    pub profile: Option<Profile>,
}

pub struct UserAdmin {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    password_min_length: usize,
}

impl UserAdmin {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        password_min_length: usize,
    ) -> Self {
        Self { users, roles, profiles, password_min_length }
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<Page<UserDetails>, AppError> {
        let page = self.users.list(filter).await?;
        // Small fixed catalogs; one read each instead of two lookups per row.
        let roles = self.roles.list_active().await?;
        let profiles = self.profiles.list_active().await?;

        Ok(page.map(|user| UserDetails {
            role: roles.iter().find(|r| r.id == user.rol_id).cloned(),
            profile: profiles.iter().find(|p| p.id == user.perfil_id).cloned(),
            user,
        }))
    }

    /// Soft-deleted users are reported as missing.
    pub async fn get(&self, id: &str) -> Result<UserDetails, AppError> {
        let user = self.find_live(id).await?;
        self.details(user).await
    }

    pub async fn details(&self, user: User) -> Result<UserDetails, AppError> {
        let role = self.roles.find_by_id(&user.rol_id).await?;
        let profile = self.profiles.find_by_id(&user.perfil_id).await?;
        Ok(UserDetails { user, role, profile })
    }

    pub async fn create(&self, draft: UserDraft, actor: &str) -> Result<UserDetails, AppError> {
        let draft = draft
            .validate(self.password_min_length)
            .map_err(|errors| AppError::fields("Datos de validación incorrectos", errors))?;

        self.ensure_unique(&draft.email, &draft.username, None).await?;
        self.ensure_references(&draft.rol_id, &draft.perfil_id).await?;

        let user = User::new(NewUserParams {
            password_hash: hash_password(&draft.password)?,
            nombre: draft.nombre,
            apellido: draft.apellido,
            email: draft.email,
            username: draft.username,
            rol_id: draft.rol_id,
            perfil_id: draft.perfil_id,
            telefono: draft.telefono,
            direccion: draft.direccion,
            created_by: Some(actor.to_string()),
        });

        let created = self.users.create(&user).await?;
        info!("Created user {} ({}) by {}", created.id, created.username, actor);
        self.details(created).await
    }

    pub async fn update(&self, id: &str, patch: UserPatch, actor: &str) -> Result<UserDetails, AppError> {
        let mut user = self.find_live(id).await?;
        let (previous_rol, previous_perfil) = (user.rol_id.clone(), user.perfil_id.clone());

        let password = user
            .apply(patch, self.password_min_length, actor, Utc::now())
            .map_err(|errors| AppError::fields("Datos de validación incorrectos", errors))?;

        self.ensure_unique(&user.email, &user.username, Some(&user.id)).await?;
        if user.rol_id != previous_rol || user.perfil_id != previous_perfil {
            self.ensure_references(&user.rol_id, &user.perfil_id).await?;
        }
        if let Some(password) = password {
            user.password_hash = hash_password(&password)?;
        }

        let updated = self.users.update(&user).await?;
        info!("Updated user {} by {}", id, actor);
        self.details(updated).await
    }

    pub async fn set_status(&self, id: &str, estado: UserStatus, actor: &str) -> Result<UserDetails, AppError> {
        let mut user = self.find_live(id).await?;
        user.estado = estado;
        user.updated_by = Some(actor.to_string());
        user.updated_at = Utc::now();

        let updated = self.users.update(&user).await?;
        info!("User {} set to '{}' by {}", id, estado.as_str(), actor);
        self.details(updated).await
    }

    pub async fn delete(&self, id: &str, actor: &str) -> Result<(), AppError> {
        if id == actor {
            warn!("User {} attempted to delete their own account", actor);
            return Err(AppError::Validation("No puedes eliminar tu propio usuario".into()));
        }
        self.find_live(id).await?;
        self.users.soft_delete(id, actor).await?;
        info!("Deactivated user {} by {}", id, actor);
        Ok(())
    }

    pub async fn roles(&self) -> Result<Vec<Role>, AppError> {
        self.roles.list_active().await
    }

    pub async fn profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.profiles.list_active().await
    }

    async fn find_live(&self, id: &str) -> Result<User, AppError> {
        match self.users.find_by_id(id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::NotFound(NOT_FOUND.into())),
        }
    }

    async fn ensure_unique(&self, email: &str, username: &str, own_id: Option<&str>) -> Result<(), AppError> {
        let taken_by_other = |user: &User| own_id != Some(user.id.as_str());

        if let Some(existing) = self.users.find_by_email(email).await?
            && taken_by_other(&existing)
        {
            return Err(AppError::Conflict("El email ya está registrado".into()));
        }
        if let Some(existing) = self.users.find_by_username(username).await?
            && taken_by_other(&existing)
        {
            return Err(AppError::Conflict("El nombre de usuario ya está en uso".into()));
        }
        Ok(())
    }

    async fn ensure_references(&self, rol_id: &str, perfil_id: &str) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if !matches!(self.roles.find_by_id(rol_id).await?, Some(role) if role.is_active) {
            errors.push(FieldError::new("rol_id", "El rol indicado no existe"));
        }
        if !matches!(self.profiles.find_by_id(perfil_id).await?, Some(profile) if profile.is_active) {
            errors.push(FieldError::new("perfil_id", "El perfil indicado no existe"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::fields("Datos de validación incorrectos", errors))
        }
    }
}
