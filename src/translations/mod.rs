//! Translations - Localized User-Facing Messages
//!
//! Lookup falls back locale -> default locale (English) -> raw key, so a
//! missing entry degrades to something readable instead of failing.

use serde::{Deserialize, Serialize};

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Bn,
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hi" => Self::Hi,
            "bn" => Self::Bn,
            _ => Self::En,
        }
    }
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Bn => "bn",
        }
    }
}

/// (key, en, hi, bn)
const ENTRIES: &[(&str, &str, &str, &str)] = &[
    (
        "appTitle",
        "Safai Citizen",
        "सफाई नागरिक",
        "সাফাই নাগরিক",
    ),
    (
        "appSubtitle",
        "Help make your city cleaner by reporting issues with live camera photos",
        "लाइव कैमरा फोटो के साथ मुद्दों की रिपोर्ट करके अपने शहर को साफ बनाने में मदद करें",
        "লাইভ ক্যামেরা ফটো দিয়ে সমস্যা রিপোর্ট করে আপনার শহরকে পরিষ্কার করতে সাহায্য করুন",
    ),
    (
        "uploadPhotos",
        "Upload Photos",
        "फोटो अपलोड करें",
        "ফটো আপলোড করুন",
    ),
    (
        "uploading",
        "Uploading...",
        "अपलोड हो रहा है...",
        "আপলোড হচ্ছে...",
    ),
    (
        "uploadSuccess",
        "photo(s) uploaded successfully!",
        "फोटो सफलतापूर्वक अपलोड हो गए!",
        "ফটো সফলভাবে আপলোড হয়েছে!",
    ),
    (
        "uploadFailed",
        "Upload failed. Please try again.",
        "अपलोड विफल। कृपया पुनः प्रयास करें।",
        "আপলোড ব্যর্থ। অনুগ্রহ করে আবার চেষ্টা করুন।",
    ),
    (
        "uploaded",
        "Uploaded",
        "अपलोड हो गया",
        "আপলোড হয়েছে",
    ),
    (
        "pendingUpload",
        "Pending Upload",
        "अपलोड लंबित",
        "আপলোড বাকি",
    ),
    (
        "locationAccessDenied",
        "Location access denied. Photos will be uploaded without location data.",
        "स्थान की पहुंच से इनकार। फोटो बिना स्थान डेटा के अपलोड होंगे।",
        "অবস্থান অ্যাক্সেস অস্বীকার। ফটো অবস্থান ডেটা ছাড়াই আপলোড হবে।",
    ),
    (
        "cameraAccessFailed",
        "Failed to access camera. Please check permissions.",
        "कैमरा तक पहुंचने में विफल। कृपया अनुमतियों की जांच करें।",
        "ক্যামেরা অ্যাক্সেস করতে ব্যর্থ। অনুগ্রহ করে অনুমতি পরীক্ষা করুন।",
    ),
    (
        "cloudinaryNotConfigured",
        "Image host not configured! Please set CLOUDINARY_CLOUD_NAME with your actual cloud name.",
        "क्लाउडिनरी कॉन्फ़िगर नहीं है! कृपया CLOUDINARY_CLOUD_NAME सेट करें।",
        "ক্লাউডিনারি কনফিগার করা হয়নি! অনুগ্রহ করে CLOUDINARY_CLOUD_NAME সেট করুন।",
    ),
];

/// Translate `key` for `lang`, falling back to English and then to the
/// raw key when an entry or translation is missing.
pub fn lookup<'a>(lang: Language, key: &'a str) -> &'a str {
    let Some(entry) = ENTRIES.iter().find(|(k, ..)| *k == key) else {
        return key;
    };

    let localized = match lang {
        Language::En => entry.1,
        Language::Hi => entry.2,
        Language::Bn => entry.3,
    };

    if localized.is_empty() {
        entry.1
    } else {
        localized
    }
}
