//! Write payloads accepted by the catalog
//!
//! Field limits mirror the column widths in the migration. References to
//! other records are optional at the serde level so a missing value surfaces
//! as a field error instead of a deserialization failure.

use chrono::NaiveDate;
use serde::Deserialize;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Width of `tags.name`
pub const MAX_TAG_LEN: usize = 100;

/// Blank tags are dropped before saving; the rest must fit the tag column
#[allow(clippy::ptr_arg)]
fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    match tags.iter().find(|tag| tag.trim().chars().count() > MAX_TAG_LEN) {
        Some(tag) => {
            let mut error = ValidationError::new("tag_length");
            error.message = Some(Cow::from(format!(
                "Tag \"{}\" is longer than {} characters.",
                tag.trim().chars().take(20).collect::<String>(),
                MAX_TAG_LEN
            )));
            Err(error)
        }
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct JournalForm {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters."))]
    pub name: String,
    pub desc: String,
    #[validate(length(max = 150))]
    pub link: String,
    #[validate(length(max = 255))]
    pub front_cover: String,
    #[validate(length(max = 255))]
    pub back_cover: Option<String>,
    #[validate(length(max = 350))]
    pub custom_txt: String,
    pub custom_num: Option<i32>,
    pub custom_bool: bool,
    pub publisher_id: Option<Uuid>,
    pub county_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub editors: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct IssueForm {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters."))]
    pub name: String,
    pub volume: Option<i16>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub issn: String,
    #[validate(length(max = 255))]
    pub file: String,
    pub desc: String,
    #[validate(length(max = 150))]
    pub link: String,
    #[validate(length(max = 255))]
    pub front_cover: String,
    #[validate(length(max = 255))]
    pub back_cover: String,
    #[validate(length(max = 350))]
    pub custom_txt: String,
    pub custom_num: Option<i32>,
    pub custom_bool: bool,
    pub redactor_id: Option<Uuid>,
    pub journal_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ArticleImageForm {
    #[validate(length(max = 50))]
    pub name: String,
    #[validate(length(max = 250))]
    pub desc: String,
    #[validate(length(min = 1, max = 255, message = "An image file path of at most 255 characters is required."))]
    pub img: String,
    #[validate(length(max = 50))]
    pub photo_by: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ArticleForm {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters."))]
    pub name: String,
    #[validate(length(max = 250))]
    pub sub: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub text: String,
    #[validate(length(max = 255))]
    pub file: String,
    #[validate(length(max = 150))]
    pub link: String,
    #[validate(length(max = 350))]
    pub custom_txt: String,
    pub custom_num: Option<i32>,
    pub custom_bool: bool,
    pub authors: Vec<Uuid>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    /// Replaces the stored images when present
    pub images: Option<Vec<ArticleImageForm>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: String,
    pub desc: String,
    #[validate(length(max = 150))]
    pub link: String,
    #[validate(length(max = 255))]
    pub front_cover: Option<String>,
    #[validate(length(max = 255))]
    pub back_cover: Option<String>,
    pub volume: Option<i16>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub issn: String,
    #[validate(length(max = 255))]
    pub file: String,
    #[validate(length(max = 350))]
    pub custom_txt: String,
    pub custom_num: Option<i32>,
    pub custom_bool: bool,
    pub authors: Vec<Uuid>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters."))]
    pub last_name: String,
    /// Display name; derived from first and last name when blank
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub org_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: String,
    #[validate(length(min = 1, message = "Text is required."))]
    pub text: String,
    #[validate(length(max = 255))]
    pub image: String,
    #[validate(length(min = 1, max = 50, message = "Author must be between 1 and 50 characters."))]
    pub author: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct OrganizationForm {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(length(max = 250))]
    pub desc: String,
    pub county_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
}

/// City or county
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PlaceForm {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."), length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 200))]
    pub first_name: String,
    #[validate(length(max = 200))]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(length(max = 200))]
    pub first_name: String,
    #[validate(length(max = 200))]
    pub last_name: String,
    #[validate(length(max = 255))]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_form_reads_abstract_key() {
        let form: ArticleForm = serde_json::from_value(serde_json::json!({
            "name": "Hekkende vadefugl",
            "abstract": "Tellinger fra Jæren",
            "tags": ["vadefugl"]
        }))
        .unwrap();

        assert_eq!(form.abstract_text, "Tellinger fra Jæren");
        assert!(form.images.is_none());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let form = JournalForm::default();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_missing_image_file() {
        let image = ArticleImageForm {
            name: "Vipe".into(),
            ..Default::default()
        };
        assert!(image.validate().is_err());
    }

    fn long(len: usize) -> String {
        "x".repeat(len)
    }

    fn failing_fields<F: Validate>(form: &F) -> Vec<String> {
        match form.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => {
                let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                fields
            }
        }
    }

    #[test]
    fn test_image_fields_fit_their_columns() {
        let image = ArticleImageForm {
            name: long(50),
            desc: long(250),
            img: "files/images/vipe.jpg".into(),
            photo_by: long(50),
        };
        assert!(image.validate().is_ok());

        let image = ArticleImageForm {
            name: long(120),
            desc: long(300),
            img: long(256),
            photo_by: long(120),
        };
        assert_eq!(failing_fields(&image), ["desc", "img", "name", "photo_by"]);
    }

    #[test]
    fn test_tags_longer_than_column_are_rejected() {
        let form = ArticleForm {
            name: "Vipeteljing".into(),
            tags: vec![long(100), " ".into()],
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        let form = ArticleForm {
            name: "Vipeteljing".into(),
            tags: vec!["Vadefugl".into(), long(500)],
            file: long(400),
            ..Default::default()
        };
        assert_eq!(failing_fields(&form), ["file", "tags"]);

        let book = BookForm {
            name: "Vadefugl".into(),
            tags: vec![long(101)],
            ..Default::default()
        };
        assert_eq!(failing_fields(&book), ["tags"]);
    }

    #[test]
    fn test_file_paths_fit_their_columns() {
        let book = BookForm {
            name: "Vadefugl".into(),
            file: long(256),
            front_cover: Some(long(256)),
            back_cover: Some(long(255)),
            ..Default::default()
        };
        assert_eq!(failing_fields(&book), ["file", "front_cover"]);

        let issue = IssueForm {
            name: "Nr. 1".into(),
            file: long(256),
            front_cover: long(256),
            back_cover: long(256),
            ..Default::default()
        };
        assert_eq!(failing_fields(&issue), ["back_cover", "file", "front_cover"]);

        let journal = JournalForm {
            name: "Ornis Norvegica".into(),
            back_cover: Some(long(256)),
            ..Default::default()
        };
        assert_eq!(failing_fields(&journal), ["back_cover"]);

        let post = PostForm {
            name: "Nytt".into(),
            text: "Tekst".into(),
            author: "Redaksjonen".into(),
            image: long(256),
        };
        assert_eq!(failing_fields(&post), ["image"]);

        let profile = ProfileForm {
            avatar: Some(long(256)),
            ..Default::default()
        };
        assert_eq!(failing_fields(&profile), ["avatar"]);
    }

    #[test]
    fn test_registration_email_is_optional() {
        let form = RegistrationForm {
            username: "kjell".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        let bad = RegistrationForm {
            username: "kjell".into(),
            email: Some("not-an-address".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
