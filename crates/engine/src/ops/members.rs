use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Member, MemberRole, NewMember, ResultEngine, UpdateMember, members,
    util::{optional_text, require_name},
    validate,
};

use super::{Engine, with_tx};

const MEMBER_NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 100;
const PHONE_MAX: usize = 20;

fn checked_email(email: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(email) = optional_text(email, "email", EMAIL_MAX)? else {
        return Ok(None);
    };
    if !email.contains('@') {
        return Err(EngineError::Validation(format!(
            "email {email:?} is malformed"
        )));
    }
    Ok(Some(email))
}

impl Engine {
    /// Add a member to a family. Email and phone are optional but must be
    /// unique across all members when present.
    pub async fn create_member(&self, cmd: NewMember) -> ResultEngine<Member> {
        let name = require_name(&cmd.name, "member name", MEMBER_NAME_MAX)?;
        let email = checked_email(cmd.email.as_deref())?;
        let phone = optional_text(cmd.phone.as_deref(), "phone", PHONE_MAX)?;

        with_tx!(self, |db_tx| {
            if !validate::family_exists(&db_tx, cmd.family_id).await? {
                return Err(EngineError::NotFound("family".to_string()));
            }
            if let Some(email) = &email
                && validate::member_email_taken(&db_tx, email, None).await?
            {
                return Err(EngineError::Conflict(format!(
                    "email {email:?} already in use"
                )));
            }
            if let Some(phone) = &phone
                && validate::member_phone_taken(&db_tx, phone, None).await?
            {
                return Err(EngineError::Conflict(format!(
                    "phone {phone:?} already in use"
                )));
            }

            let member = Member {
                id: Uuid::new_v4(),
                family_id: cmd.family_id,
                name,
                role: cmd.role,
                phone,
                email,
                active: true,
                created_at: Utc::now(),
            };
            members::ActiveModel::from(&member).insert(&db_tx).await?;
            Ok(member)
        })
    }

    /// Fetch a member by id, whatever its status.
    pub async fn member(&self, member_id: Uuid) -> ResultEngine<Member> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))?;
        Member::try_from(model)
    }

    /// List the active members of one family, oldest first.
    pub async fn family_members(&self, family_id: Uuid) -> ResultEngine<Vec<Member>> {
        let models = members::Entity::find()
            .filter(members::Column::FamilyId.eq(family_id.to_string()))
            .filter(members::Column::Status.eq(members::STATUS_ACTIVE))
            .order_by_asc(members::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Member::try_from).collect()
    }

    /// Update a member's profile. Only name, phone and email can change
    /// here; absent fields keep their current value.
    pub async fn update_member(&self, cmd: UpdateMember) -> ResultEngine<Member> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| require_name(n, "member name", MEMBER_NAME_MAX))
            .transpose()?;
        let email = checked_email(cmd.email.as_deref())?;
        let phone = optional_text(cmd.phone.as_deref(), "phone", PHONE_MAX)?;

        with_tx!(self, |db_tx| {
            let model = members::Entity::find_by_id(cmd.member_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("member".to_string()))?;

            if let Some(email) = &email
                && validate::member_email_taken(&db_tx, email, Some(cmd.member_id)).await?
            {
                return Err(EngineError::Conflict(format!(
                    "email {email:?} already in use"
                )));
            }
            if let Some(phone) = &phone
                && validate::member_phone_taken(&db_tx, phone, Some(cmd.member_id)).await?
            {
                return Err(EngineError::Conflict(format!(
                    "phone {phone:?} already in use"
                )));
            }

            let mut active = members::ActiveModel {
                id: ActiveValue::Set(model.id),
                ..Default::default()
            };
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(email) = email {
                active.email = ActiveValue::Set(Some(email));
            }
            if let Some(phone) = phone {
                active.phone = ActiveValue::Set(Some(phone));
            }
            let updated = active.update(&db_tx).await?;
            Member::try_from(updated)
        })
    }

    /// Change a member's role.
    pub async fn change_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> ResultEngine<Member> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))?;

        let active = members::ActiveModel {
            id: ActiveValue::Set(model.id),
            role: ActiveValue::Set(role.as_str().to_string()),
            ..Default::default()
        };
        let updated = active.update(&self.database).await?;
        Member::try_from(updated)
    }

    /// Soft-remove a member. The row stays for transaction history; the
    /// member no longer counts toward family deletion checks.
    pub async fn remove_member(&self, member_id: Uuid) -> ResultEngine<()> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))?;

        let active = members::ActiveModel {
            id: ActiveValue::Set(model.id),
            status: ActiveValue::Set(members::STATUS_REMOVED),
            ..Default::default()
        };
        active.update(&self.database).await?;
        Ok(())
    }
}
