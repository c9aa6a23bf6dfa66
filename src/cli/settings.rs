//! `settings`: translate between `@Mock` attributes and `Mockito.withSettings()` chains.

use mockchain::ChainError;
use mockchain::settings::MockAttributes;

use super::{SettingsArgs, print_json};

pub(crate) fn cmd_settings(args: SettingsArgs) -> Result<(), ChainError> {
    match (&args.annotation, &args.call) {
        (Some(annotation), _) => {
            let attributes = MockAttributes::parse_annotation(annotation)?;
            let rendered = match &args.type_name {
                Some(type_name) => attributes.render_mock_call(type_name),
                None => attributes.render_settings(),
            };
            let imports = attributes.required_imports();
            if args.json {
                return print_json(&serde_json::json!({
                    "attributes": attributes,
                    "imports": imports,
                    "code": rendered,
                }));
            }
            for fqn in imports {
                println!("import {};", fqn);
            }
            println!("\n{}", rendered);
            Ok(())
        }
        (None, Some(call)) => {
            let (type_name, attributes) = MockAttributes::parse_mock_call(call)?;
            let annotation = attributes.render_annotation()?;
            if args.json {
                return print_json(&serde_json::json!({
                    "type": type_name,
                    "attributes": attributes,
                    "code": annotation,
                }));
            }
            println!("{}", annotation);
            Ok(())
        }
        (None, None) => Err(ChainError::InvalidArgs("Pass --annotation or --call".to_string())),
    }
}
