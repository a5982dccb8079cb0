//! Multipart form collection.
//!
//! Product and store forms mix text fields, repeated fields (the parallel
//! feature lists) and file inputs, so the whole body is read into memory
//! first. The router's body limit caps its size.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use crate::services::media::Upload;

/// A fully read multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<Upload>>,
}

impl MultipartForm {
    /// Read every part of the request.
    ///
    /// # Errors
    ///
    /// Returns `MultipartError` for malformed bodies or bodies over the limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let bytes = field.bytes().await?.to_vec();
                    form.files.entry(name).or_default().push(Upload { file_name, bytes });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.entry(name).or_default().push(value);
                }
            }
        }

        Ok(form)
    }

    /// First value of a text field, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Every value of a repeated text field, in submission order.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Uploaded files for an input, skipping inputs left blank.
    #[must_use]
    pub fn files(&self, name: &str) -> Vec<Upload> {
        self.files
            .get(name)
            .map(|files| files.iter().filter(|f| !f.is_blank()).cloned().collect())
            .unwrap_or_default()
    }

    /// The single file for an input, if one was chosen.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<Upload> {
        self.files(name).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> MultipartForm {
        let mut form = MultipartForm::default();
        form.fields
            .insert("feature_name".to_owned(), vec!["Color".to_owned(), "Size".to_owned()]);
        form.fields.insert("name".to_owned(), vec!["Lamp".to_owned()]);
        form.files.insert(
            "images".to_owned(),
            vec![
                Upload {
                    file_name: "a.png".to_owned(),
                    bytes: vec![1, 2, 3],
                },
                Upload {
                    file_name: String::new(),
                    bytes: Vec::new(),
                },
            ],
        );
        form
    }

    #[test]
    fn test_text_and_repeated_fields() {
        let form = form();
        assert_eq!(form.text("name"), "Lamp");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.all("feature_name"), vec!["Color", "Size"]);
        assert!(form.all("feature_value").is_empty());
    }

    #[test]
    fn test_blank_file_inputs_are_skipped() {
        let form = form();
        assert_eq!(form.files("images").len(), 1);
        assert_eq!(form.file("images").map(|f| f.file_name), Some("a.png".to_owned()));
        assert!(form.file("logo").is_none());
    }
}
