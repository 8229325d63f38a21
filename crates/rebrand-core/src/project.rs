use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{RebrandError, Result};
use crate::metadata::{value_from_json_file, value_from_xml_file};
use crate::text::java_package_to_dir_path;

pub const APP_JSON: &str = "app.json";
pub const PACKAGE_JSON: &str = "package.json";
pub const ANDROID_MANIFEST: &str = "android/app/src/main/AndroidManifest.xml";
pub const ANDROID_JAVA_ROOT: &str = "android/app/src/main/java";

/// Files whose contents literally carry the app key.
pub fn ios_files_with_app_key_in_content(app_key: &str) -> Vec<PathBuf> {
    [
        "index.ios.js".to_string(),
        format!("ios/{app_key}.xcodeproj/project.pbxproj"),
        format!("ios/{app_key}.xcworkspace/contents.xcworkspacedata"),
        format!("ios/{app_key}.xcodeproj/xcshareddata/xcschemes/{app_key}-tvOS.xcscheme"),
        format!("ios/{app_key}.xcodeproj/xcshareddata/xcschemes/{app_key}.xcscheme"),
        format!("ios/{app_key}/AppDelegate.m"),
        format!("ios/{app_key}Tests/{app_key}Tests.m"),
        "ios/build/info.plist".to_string(),
        "ios/Podfile".to_string(),
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

pub fn ios_launch_screen_files(app_key: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("ios/{app_key}/Base.lproj/LaunchScreen.xib")),
        PathBuf::from(format!("ios/{app_key}/LaunchScreen.storyboard")),
    ]
}

pub fn ios_info_plist(app_key: &str) -> PathBuf {
    PathBuf::from(format!("ios/{app_key}/Info.plist"))
}

pub fn ios_xcode_project_file(app_key: &str) -> PathBuf {
    PathBuf::from(format!("ios/{app_key}.xcodeproj/project.pbxproj"))
}

/// Top-level iOS folders and files named after the app key.
pub fn ios_top_level_paths(app_key: &str) -> Vec<String> {
    vec![
        format!("ios/{app_key}"),
        format!("ios/{app_key}-tvOS"),
        format!("ios/{app_key}-tvOSTests"),
        format!("ios/{app_key}.xcodeproj"),
        format!("ios/{app_key}Tests"),
        format!("ios/{app_key}.xcworkspace"),
        format!("ios/{app_key}-Bridging-Header.h"),
    ]
}

/// iOS paths named after the app key that live inside one of [`ios_top_level_paths`].
pub fn ios_nested_paths(app_key: &str) -> Vec<String> {
    vec![
        format!("ios/{app_key}.xcodeproj/xcshareddata/xcschemes/{app_key}-tvOS.xcscheme"),
        format!("ios/{app_key}.xcodeproj/xcshareddata/xcschemes/{app_key}.xcscheme"),
        format!("ios/{app_key}Tests/{app_key}Tests.m"),
        format!("ios/{app_key}/{app_key}.entitlements"),
    ]
}

pub fn android_java_package_dir(bundle_id: &str) -> PathBuf {
    Path::new(ANDROID_JAVA_ROOT).join(java_package_to_dir_path(bundle_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidInfo {
    pub bundle_id: String,
}

/// A React Native project and the identity currently written into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactNativeProject {
    root_dir: PathBuf,
    app_display_name: String,
    app_key: String,
    android: Option<AndroidInfo>,
}

impl ReactNativeProject {
    /// Reads `app.json` under `root_dir`. Android details are left undiscovered.
    pub fn build(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let app_json = root_dir.join(APP_JSON);

        if !app_json.is_file() {
            return Err(RebrandError::MissingMetadataFile { path: app_json });
        }

        let app_display_name = value_from_json_file("displayName", &app_json)?.unwrap_or_default();
        let app_key = value_from_json_file("name", &app_json)?.unwrap_or_default();
        if app_key.is_empty() {
            return Err(RebrandError::MissingAppKey { path: app_json });
        }

        info!(
            "Detected project '{}' (display name '{}') in {:?}",
            app_key, app_display_name, root_dir
        );

        Ok(Self {
            root_dir,
            app_display_name,
            app_key,
            android: None,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn app_display_name(&self) -> &str {
        &self.app_display_name
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn android(&self) -> Option<&AndroidInfo> {
        self.android.as_ref()
    }

    /// Reads the Android package from the manifest without touching `self`.
    ///
    /// A missing manifest, or one without a `package` attribute, yields `None`.
    pub fn detect_android(&self) -> Result<Option<AndroidInfo>> {
        let manifest = self.root_dir.join(ANDROID_MANIFEST);
        if !manifest.is_file() {
            debug!("No Android manifest at {:?}", manifest);
            return Ok(None);
        }

        match value_from_xml_file("manifest", "package", &manifest)? {
            Some(bundle_id) if !bundle_id.is_empty() => {
                info!("Detected Android bundle id '{}'", bundle_id);
                Ok(Some(AndroidInfo { bundle_id }))
            }
            _ => {
                warn!("Android manifest {:?} declares no package", manifest);
                Ok(None)
            }
        }
    }

    pub fn with_android_detected(self) -> Result<Self> {
        if self.android.is_some() {
            return Ok(self);
        }
        let android = self.detect_android()?;
        Ok(Self { android, ..self })
    }

    pub fn android_bundle_id(&self) -> Option<&str> {
        self.android.as_ref().map(|info| info.bundle_id.as_str())
    }

    pub fn ios_files_with_app_key_in_content(&self) -> Vec<PathBuf> {
        ios_files_with_app_key_in_content(&self.app_key)
    }

    pub fn ios_launch_screen_files(&self) -> Vec<PathBuf> {
        ios_launch_screen_files(&self.app_key)
    }

    pub fn android_java_code_root_dir(&self) -> Option<PathBuf> {
        self.android_bundle_id()
            .map(|bundle_id| self.root_dir.join(android_java_package_dir(bundle_id)))
    }
}
