use uuid::Uuid;

use api_types::member::{MemberRole, MemberView};
use engine::GroupMember;

use crate::error::Result;
use crate::providers::GroupDataSource;

/// Group roster for name and avatar chips, admins first, then by name.
pub async fn members<S: GroupDataSource>(source: &S, group_id: Uuid) -> Result<Vec<MemberView>> {
    let mut roster = source.members(group_id).await?;
    roster.sort_by(|a, b| {
        role_rank(a.role)
            .cmp(&role_rank(b.role))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    Ok(roster.into_iter().map(view).collect())
}

fn view(member: GroupMember) -> MemberView {
    MemberView {
        user_id: member.user_id,
        display_name: member.display_name,
        avatar_url: member.avatar_url,
        role: role_view(member.role),
    }
}

fn role_rank(role: engine::MemberRole) -> u8 {
    match role {
        engine::MemberRole::Admin => 0,
        engine::MemberRole::Member => 1,
    }
}

fn role_view(role: engine::MemberRole) -> MemberRole {
    match role {
        engine::MemberRole::Admin => MemberRole::Admin,
        engine::MemberRole::Member => MemberRole::Member,
    }
}
