//! Common schemas and sources for tests.

use hclref::schema::{
    AddrStep, AttributeAddrSchema, AttributeSchema, BlockAddrSchema, BlockAsTypeOf, BlockSchema,
    BlockType, BodySchema, Constraint, DependencyKeys, LabelSchema, Reference,
};
use hclref::ty::Type;

/// A small infrastructure-style language: variables, locals, outputs and
/// resources whose bodies depend on the resource type.
pub fn config_schema() -> BodySchema {
    BodySchema::new()
        .with_block("variable", variable_block())
        .with_block("locals", locals_block())
        .with_block("output", output_block())
        .with_block("resource", resource_block())
}

fn variable_block() -> BlockSchema {
    BlockSchema::new(
        BodySchema::new()
            .with_attribute("type", AttributeSchema::new(Constraint::TypeDeclaration).optional())
            .with_attribute("default", AttributeSchema::new(Type::Dynamic).optional())
            .with_attribute("description", AttributeSchema::new(Type::String).optional()),
    )
    .with_labels([LabelSchema::new("name")])
    .with_address(
        BlockAddrSchema::new([AddrStep::stat("var"), AddrStep::Label(0)])
            .as_reference()
            .scope("variable")
            .friendly_name("variable")
            .as_type_of(BlockAsTypeOf {
                attribute_expr: Some("type".into()),
                attribute_value: Some("default".into()),
            }),
    )
}

fn locals_block() -> BlockSchema {
    BlockSchema::new(BodySchema::new().with_any_attribute(
        AttributeSchema::new(Type::Dynamic).with_address(
            AttributeAddrSchema::new([AddrStep::stat("local"), AddrStep::AttrName])
                .as_expr_type()
                .as_reference()
                .scope("local"),
        ),
    ))
}

fn output_block() -> BlockSchema {
    BlockSchema::new(BodySchema::new().with_attribute(
        "value",
        AttributeSchema::new(Reference::of_type(Type::Dynamic)),
    ))
    .with_labels([LabelSchema::new("name")])
}

fn resource_block() -> BlockSchema {
    let string_or_ref = Constraint::OneOf(vec![
        Reference::of_type(Type::String).into(),
        Type::String.into(),
    ]);

    BlockSchema::new(
        BodySchema::new()
            .with_attribute("count", AttributeSchema::new(Type::Number).optional())
            .with_attribute(
                "depends_on",
                AttributeSchema::new(Constraint::set(Reference::of_scope("resource").into()))
                    .optional(),
            ),
    )
    .with_labels([LabelSchema::dep_key("type"), LabelSchema::new("name")])
    .with_address(
        BlockAddrSchema::new([AddrStep::Label(0), AddrStep::Label(1)])
            .as_reference()
            .scope("resource")
            .body_as_data()
            .dependent_body_as_data()
            .infer_dependent_body(),
    )
    .with_dependent_body(
        DependencyKeys::label(0, "aws_instance"),
        BodySchema::new()
            .with_attribute("ami", AttributeSchema::new(Type::String))
            .with_attribute("subnet_id", AttributeSchema::new(string_or_ref).optional())
            .with_attribute(
                "tags",
                AttributeSchema::new(Constraint::map(Type::String.into())).optional(),
            )
            .with_block(
                "ebs_block_device",
                BlockSchema::new(
                    BodySchema::new()
                        .with_attribute("volume_size", AttributeSchema::new(Type::Number)),
                )
                .with_type(BlockType::List),
            ),
    )
    .with_dependent_body(
        DependencyKeys::label(0, "aws_subnet"),
        BodySchema::new()
            .with_attribute("cidr_block", AttributeSchema::new(Type::String))
            .with_attribute("id", AttributeSchema::new(Type::String).optional()),
    )
}

pub const VARIABLES: &str = r#"variable "region" {
  type    = string
  default = "eu-west-1"
}

variable "zones" {
  default = ["a", "b"]
}
"#;

pub const RESOURCES: &str = r#"resource "aws_subnet" "main" {
  cidr_block = "10.0.0.0/24"
}

resource "aws_instance" "web" {
  ami       = "ami-123"
  subnet_id = aws_subnet.main.id
  tags = {
    Name = "web"
  }

  ebs_block_device {
    volume_size = 10
  }
}
"#;

pub const OUTPUTS: &str = r#"locals {
  name = "web"
}

output "region" {
  value = var.region
}

output "size" {
  value = aws_instance.web.ebs_block_device[0].volume_size
}
"#;
