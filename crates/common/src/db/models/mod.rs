//! SeaORM entity models
//!
//! Database entities for the Fuglelitt catalog

mod county;
mod city;
mod organization;
mod user;
mod profile;
mod journal;
mod journal_editor;
mod issue;
mod article;
mod article_image;
mod author;
mod book;
mod post;
mod tag;
mod article_author;
mod book_author;
mod article_tag;
mod book_tag;

pub use county::{
    Entity as CountyEntity,
    Model as County,
    ActiveModel as CountyActiveModel,
    Column as CountyColumn,
};

pub use city::{
    Entity as CityEntity,
    Model as City,
    ActiveModel as CityActiveModel,
    Column as CityColumn,
};

pub use organization::{
    Entity as OrganizationEntity,
    Model as Organization,
    ActiveModel as OrganizationActiveModel,
    Column as OrganizationColumn,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};

pub use profile::{
    Entity as ProfileEntity,
    Model as Profile,
    ActiveModel as ProfileActiveModel,
    Column as ProfileColumn,
};

pub use journal::{
    Entity as JournalEntity,
    Model as Journal,
    ActiveModel as JournalActiveModel,
    Column as JournalColumn,
};

pub use journal_editor::{
    Entity as JournalEditorEntity,
    Model as JournalEditor,
    ActiveModel as JournalEditorActiveModel,
    Column as JournalEditorColumn,
};

pub use issue::{
    Entity as IssueEntity,
    Model as Issue,
    ActiveModel as IssueActiveModel,
    Column as IssueColumn,
};

pub use article::{
    Entity as ArticleEntity,
    Model as Article,
    ActiveModel as ArticleActiveModel,
    Column as ArticleColumn,
};

pub use article_image::{
    Entity as ArticleImageEntity,
    Model as ArticleImage,
    ActiveModel as ArticleImageActiveModel,
    Column as ArticleImageColumn,
};

pub use author::{
    Entity as AuthorEntity,
    Model as Author,
    ActiveModel as AuthorActiveModel,
    Column as AuthorColumn,
};

pub use book::{
    Entity as BookEntity,
    Model as Book,
    ActiveModel as BookActiveModel,
    Column as BookColumn,
};

pub use post::{
    Entity as PostEntity,
    Model as Post,
    ActiveModel as PostActiveModel,
    Column as PostColumn,
};

pub use tag::{
    Entity as TagEntity,
    Model as Tag,
    ActiveModel as TagActiveModel,
    Column as TagColumn,
};

pub use article_author::{
    Entity as ArticleAuthorEntity,
    Model as ArticleAuthor,
    ActiveModel as ArticleAuthorActiveModel,
    Column as ArticleAuthorColumn,
};

pub use book_author::{
    Entity as BookAuthorEntity,
    Model as BookAuthor,
    ActiveModel as BookAuthorActiveModel,
    Column as BookAuthorColumn,
};

pub use article_tag::{
    Entity as ArticleTagEntity,
    Model as ArticleTag,
    ActiveModel as ArticleTagActiveModel,
    Column as ArticleTagColumn,
};

pub use book_tag::{
    Entity as BookTagEntity,
    Model as BookTag,
    ActiveModel as BookTagActiveModel,
    Column as BookTagColumn,
};
