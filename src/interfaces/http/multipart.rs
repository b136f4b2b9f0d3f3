use crate::application::use_cases::generate_tests::GenerateTestsRequest;
use crate::domain::error::{AppError, Result};
use crate::interfaces::state::RequestDefaults;
use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use std::collections::HashMap;

const SCREENSHOT_FIELD: &str = "screenshot";

/// Text fields plus the uploaded screenshot of a `/generate-tests` form.
#[derive(Debug, Default)]
pub struct GenerateForm {
    fields: HashMap<String, String>,
    screenshot: Option<(String, Vec<u8>)>,
}

impl GenerateForm {
    pub async fn read(mut payload: Multipart) -> Result<Self> {
        let mut form = GenerateForm::default();

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .map(str::to_string);

            let mut data = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {}", e)))?
            {
                data.extend_from_slice(&chunk);
            }

            if name == SCREENSHOT_FIELD {
                form.screenshot = Some((filename.unwrap_or_default(), data));
            } else {
                form.fields
                    .insert(name, String::from_utf8_lossy(&data).into_owned());
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|value| value.trim().to_string())
    }

    pub fn into_request(self, defaults: &RequestDefaults) -> Result<GenerateTestsRequest> {
        let expected_count = match self.text("expected_count") {
            Some(raw) if !raw.is_empty() => raw.parse::<u32>().map_err(|_| {
                AppError::ValidationError("expected_count must be a positive integer".to_string())
            })?,
            _ => defaults.expected_count,
        };

        let run_dates = match self.text("run_dates") {
            Some(raw) if !raw.is_empty() => parse_run_dates(&raw),
            _ => defaults.run_dates.clone(),
        };

        let description = self.text("description").unwrap_or_default();
        let release_version = self
            .text("release_version")
            .unwrap_or_else(|| defaults.release_version.clone());
        let tester_name = self
            .text("tester_name")
            .unwrap_or_else(|| defaults.tester_name.clone());
        let model_override = self.text("model_override").filter(|model| !model.is_empty());
        let (image_filename, image_bytes) = self.screenshot.unwrap_or_default();

        Ok(GenerateTestsRequest {
            description,
            release_version,
            tester_name,
            run_dates,
            expected_count,
            model_override,
            image_bytes,
            image_filename,
        })
    }
}

/// Comma-separated dates; blank entries are dropped.
fn parse_run_dates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .map(str::to_string)
        .collect()
}
