use serde::Serialize;

/// What a drawn box stands for; decides its stroke and label color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// The label of a regular key/value record.
    Key,
    /// A value whose key was drawn.
    Value,
    /// A value whose key is only a marker and was not drawn.
    MarkerValue,
}

impl Role {
    pub const fn name(&self) -> &str {
        match self {
            Role::Key => "key",
            Role::Value => "value",
            Role::MarkerValue => "marker-value",
        }
    }

    /// Named color as understood by image tools (`blue`, `purple`).
    pub const fn color_name(&self) -> &str {
        match self {
            Role::Key | Role::Value => "blue",
            Role::MarkerValue => "purple",
        }
    }

    pub const fn color(&self) -> [u8; 3] {
        match self {
            Role::Key | Role::Value => [0, 0, 255], // Blue
            Role::MarkerValue => [128, 0, 128],     // Purple
        }
    }

    /// Stroke color with full opacity.
    pub const fn rgba(&self) -> [u8; 4] {
        let [r, g, b] = self.color();
        [r, g, b, 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_colors() {
        assert_eq!(Role::Key.color_name(), "blue");
        assert_eq!(Role::Value.color_name(), "blue");
        assert_eq!(Role::MarkerValue.color_name(), "purple");

        assert_eq!(Role::Key.color(), Role::Value.color());
        assert_eq!(Role::MarkerValue.rgba(), [128, 0, 128, 255]);
    }

    #[test]
    fn test_role_serialize() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(serde_json::to_string(&Role::MarkerValue)?, "\"marker-value\"");
        assert_eq!(serde_json::to_string(&Role::Key)?, "\"key\"");
        Ok(())
    }
}
