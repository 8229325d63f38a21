use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::change::FileChange;
use crate::discover;
use crate::error::{RebrandError, Result};
use crate::project::{
    android_java_package_dir, ios_info_plist, ios_nested_paths, ios_top_level_paths,
    ios_xcode_project_file, AndroidInfo, ReactNativeProject, ANDROID_JAVA_ROOT, ANDROID_MANIFEST,
    APP_JSON, PACKAGE_JSON,
};
use crate::text::{replace_first_match, without_spaces};

const ANDROID_STRINGS: &str = "android/app/src/main/res/values/strings.xml";
const ANDROID_ENTRY_FILES: [&str; 2] = ["index.android.js", "android/settings.gradle"];
const ANDROID_BUILD_CONFIG_FILES: [&str; 3] =
    ["android/app/BUCK", "android/app/_BUCK", "android/app/build.gradle"];
const ANDROID_BUILD_DIRS: [&str; 3] = ["android/.gradle", "android/app/build", "android/build"];
const IOS_BUILD_DIR: &str = "ios/build";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSelection {
    pub ios: bool,
    pub android: bool,
}

impl PlatformSelection {
    pub fn all() -> Self {
        Self {
            ios: true,
            android: true,
        }
    }

    /// Neither flag means both platforms; setting one narrows to the flags that are set.
    pub fn from_flags(ios: bool, android: bool) -> Self {
        Self {
            ios: !android || ios,
            android: !ios || android,
        }
    }
}

impl Default for PlatformSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Derives ordered [`FileChange`] lists that move a project to a new identity.
///
/// The planner only reads the project; it never writes to it or to disk.
pub struct ProjectRenamer<'a> {
    project: &'a ReactNativeProject,
}

impl<'a> ProjectRenamer<'a> {
    pub fn new(project: &'a ReactNativeProject) -> Self {
        Self { project }
    }

    /// Plans renaming the app to `new_display_name`; the new app key is the name
    /// without whitespace.
    ///
    /// Within the iOS group, content updates come first, then top-level moves, then
    /// moves of paths nested in the moved folders.
    pub fn rename_app(&self, new_display_name: &str, platforms: PlatformSelection) -> Vec<FileChange> {
        let new_app_key = without_spaces(new_display_name);
        info!(
            "Planning rename '{}' -> '{}' (key '{}' -> '{}')",
            self.project.app_display_name(),
            new_display_name,
            self.project.app_key(),
            new_app_key
        );

        let mut changes = Vec::new();
        if platforms.ios {
            changes.extend(self.ios_changes_to_new_name(&new_app_key, new_display_name));
        }
        if platforms.android {
            changes.extend(self.android_changes_to_new_name(&new_app_key, new_display_name));
        }
        changes.extend(self.common_changes_to_new_name(&new_app_key, new_display_name));

        debug!("Planned {} change(s)", changes.len());
        changes
    }

    /// Plans changing the bundle id. Android changes are planned only when the project
    /// declares an Android package.
    pub fn change_bundle_id(
        &self,
        new_bundle_id: &str,
        platforms: PlatformSelection,
    ) -> Result<Vec<FileChange>> {
        validate_bundle_id(new_bundle_id)?;

        let android = match self.project.android() {
            Some(info) => Some(info.clone()),
            None => self.project.detect_android()?,
        };

        let mut changes = Vec::new();
        if platforms.ios {
            changes.extend(self.ios_changes_to_new_bundle_id(new_bundle_id)?);
        }
        if platforms.android {
            match &android {
                Some(info) => {
                    changes.extend(self.android_changes_to_new_bundle_id(info, new_bundle_id)?)
                }
                None => info!("No Android bundle id found, skipping Android changes"),
            }
        }

        debug!("Planned {} change(s)", changes.len());
        Ok(changes)
    }

    fn ios_changes_to_new_name(&self, new_app_key: &str, new_display_name: &str) -> Vec<FileChange> {
        let app_key = self.project.app_key();
        let display_name = self.project.app_display_name();
        let mut changes = vec![FileChange::update_content(
            self.project.ios_files_with_app_key_in_content(),
            app_key,
            new_app_key,
        )];

        if display_name.is_empty() {
            debug!("No current display name, skipping iOS display name updates");
        } else {
            changes.push(FileChange::update_content(
                self.project.ios_launch_screen_files(),
                format!("text=\"{display_name}\""),
                format!("text=\"{new_display_name}\""),
            ));
            changes.push(FileChange::update_content(
                [ios_info_plist(app_key)],
                display_name,
                new_display_name,
            ));
        }

        for path in ios_top_level_paths(app_key) {
            let dest = replace_first_match(&path, app_key, new_app_key);
            if dest != path {
                changes.push(FileChange::move_path(path, dest));
            }
        }

        // Parents were moved above, so the first key occurrence is already renamed on disk.
        for path in ios_nested_paths(app_key) {
            let target = PathBuf::from(replace_first_match(&path, app_key, new_app_key));
            let dest = rename_file_name(&target, app_key, new_app_key);
            if dest != target {
                changes.push(FileChange::move_path(target, dest));
            }
        }

        changes.push(FileChange::remove([IOS_BUILD_DIR]));
        changes
    }

    fn android_changes_to_new_name(&self, new_app_key: &str, new_display_name: &str) -> Vec<FileChange> {
        let app_name_resource = format!(
            r#"<string name=["']app_name["']>{}</string>"#,
            regex::escape(self.project.app_display_name())
        );
        let mut changes = Vec::new();

        match Regex::new(&app_name_resource) {
            Ok(pattern) => changes.push(FileChange::update_content(
                [ANDROID_STRINGS],
                pattern,
                format!("<string name=\"app_name\">{new_display_name}</string>"),
            )),
            Err(e) => debug!("Skipping app_name resource update: {}", e),
        }

        changes.push(FileChange::update_content(
            ANDROID_ENTRY_FILES,
            self.project.app_key(),
            new_app_key,
        ));
        changes.push(FileChange::remove(ANDROID_BUILD_DIRS));
        changes
    }

    fn common_changes_to_new_name(&self, new_app_key: &str, new_display_name: &str) -> Vec<FileChange> {
        vec![
            FileChange::update_content(
                [APP_JSON],
                format!("\"displayName\": {}", json_string(self.project.app_display_name())),
                format!("\"displayName\": {}", json_string(new_display_name)),
            ),
            FileChange::update_content(
                [APP_JSON, PACKAGE_JSON],
                format!("\"name\": {}", json_string(self.project.app_key())),
                format!("\"name\": {}", json_string(new_app_key)),
            ),
        ]
    }

    fn ios_changes_to_new_bundle_id(&self, new_bundle_id: &str) -> Result<Vec<FileChange>> {
        let pattern = Regex::new(r#"PRODUCT_BUNDLE_IDENTIFIER = "(.*?)""#)?;
        Ok(vec![FileChange::update_content(
            [ios_xcode_project_file(self.project.app_key())],
            pattern,
            format!("PRODUCT_BUNDLE_IDENTIFIER = \"{new_bundle_id}\""),
        )])
    }

    fn android_changes_to_new_bundle_id(
        &self,
        android: &AndroidInfo,
        new_bundle_id: &str,
    ) -> Result<Vec<FileChange>> {
        let old_bundle_id = android.bundle_id.as_str();
        let root = self.project.root_dir();
        let old_package_dir = android_java_package_dir(old_bundle_id);
        let new_package_dir = android_java_package_dir(new_bundle_id);

        if new_bundle_id != old_bundle_id && new_package_dir.starts_with(&old_package_dir) {
            return Err(RebrandError::InvalidBundleId {
                bundle_id: new_bundle_id.to_string(),
                reason: format!("package directory would be nested inside '{old_bundle_id}'"),
            });
        }

        let java_glob = format!("{ANDROID_JAVA_ROOT}/**/*.java");
        let kotlin_glob = format!("{ANDROID_JAVA_ROOT}/**/*.kt");
        let source_files = discover::files_matching(root, &[&java_glob, &kotlin_glob])?;
        let escaped_old = regex::escape(old_bundle_id);

        let mut changes = vec![
            FileChange::update_content(
                [ANDROID_MANIFEST],
                format!("package=\"{old_bundle_id}\""),
                format!("package=\"{new_bundle_id}\""),
            ),
            FileChange::update_content(
                ANDROID_BUILD_CONFIG_FILES,
                format!("\"{old_bundle_id}\""),
                format!("\"{new_bundle_id}\""),
            ),
            FileChange::update_content(
                source_files.clone(),
                Regex::new(&format!(r"\bpackage {escaped_old}\b"))?,
                format!("package {new_bundle_id}"),
            ),
            FileChange::update_content(
                source_files,
                Regex::new(&format!(r"\bimport {escaped_old}\."))?,
                format!("import {new_bundle_id}."),
            ),
        ];

        if new_bundle_id == old_bundle_id {
            debug!("Android bundle id unchanged, no sources to move");
            return Ok(changes);
        }

        for child in discover::children(&root.join(&old_package_dir))? {
            let rel_child = child.strip_prefix(root).unwrap_or(&child).to_path_buf();
            changes.push(FileChange::move_into_dir(rel_child, new_package_dir.clone()));
        }
        changes.push(FileChange::remove([old_package_dir]));

        Ok(changes)
    }
}

/// Replaces the first key occurrence in the file name only, leaving the parent as is.
// Quoted and escaped JSON string literal.
fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

fn rename_file_name(path: &Path, app_key: &str, new_app_key: &str) -> PathBuf {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => path.with_file_name(replace_first_match(name, app_key, new_app_key)),
        None => path.to_path_buf(),
    }
}

fn validate_bundle_id(bundle_id: &str) -> Result<()> {
    let reason = if bundle_id.is_empty() {
        Some("bundle id is empty")
    } else if bundle_id.chars().any(char::is_whitespace) {
        Some("bundle id contains whitespace")
    } else if bundle_id.split('.').any(str::is_empty) {
        Some("bundle id has an empty segment")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RebrandError::InvalidBundleId {
            bundle_id: bundle_id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
