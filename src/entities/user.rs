use sea_orm::entity::prelude::*;

/// Registered account. `password` holds an argon2id PHC string, never
/// plaintext. The admin account is a regular row with `is_admin` set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_movie::Entity")]
    UserMovies,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::user_movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserMovies.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_movie::Relation::Movie.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_movie::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
