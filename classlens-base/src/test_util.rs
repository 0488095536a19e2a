//! Assembling class files by hand for tests

use std::collections::HashMap;

use crate::CLASS_FILE_MAGIC;

/// An attribute that has been encoded, name and length included
pub(crate) type EncodedAttribute = Vec<u8>;

pub(crate) struct ClassBuilder {
    pool: Vec<u8>,
    pool_count: u16,
    utf8s: HashMap<String, u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<u8>,
    field_count: u16,
    methods: Vec<u8>,
    method_count: u16,
    attributes: Vec<u8>,
    attribute_count: u16,
}
impl ClassBuilder {
    pub(crate) fn new(name: &str, super_name: Option<&str>) -> ClassBuilder {
        let mut builder = ClassBuilder {
            pool: Vec::new(),
            pool_count: 1,
            utf8s: HashMap::new(),
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            field_count: 0,
            methods: Vec::new(),
            method_count: 0,
            attributes: Vec::new(),
            attribute_count: 0,
        };
        builder.this_class = builder.class(name);
        builder.super_class = super_name.map_or(0, |name| builder.class(name));
        builder
    }

    pub(crate) fn access_flags(&mut self, flags: u16) -> &mut Self {
        self.access_flags = flags;
        self
    }

    fn push_entry(&mut self, data: &[u8], slots: u16) -> u16 {
        let index = self.pool_count;
        self.pool.extend_from_slice(data);
        self.pool_count += slots;
        index
    }

    pub(crate) fn utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self.utf8s.get(text) {
            return *index;
        }

        let mut data = vec![1];
        data.extend_from_slice(&(text.len() as u16).to_be_bytes());
        data.extend_from_slice(text.as_bytes());
        let index = self.push_entry(&data, 1);
        self.utf8s.insert(text.to_owned(), index);
        index
    }

    pub(crate) fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        let mut data = vec![7];
        data.extend_from_slice(&name.to_be_bytes());
        self.push_entry(&data, 1)
    }

    pub(crate) fn integer(&mut self, value: i32) -> u16 {
        let mut data = vec![3];
        data.extend_from_slice(&value.to_be_bytes());
        self.push_entry(&data, 1)
    }

    pub(crate) fn long(&mut self, value: i64) -> u16 {
        let mut data = vec![5];
        data.extend_from_slice(&value.to_be_bytes());
        self.push_entry(&data, 2)
    }

    pub(crate) fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub(crate) fn attribute(&mut self, name: &str, body: &[u8]) -> EncodedAttribute {
        let name = self.utf8(name);
        let mut data = name.to_be_bytes().to_vec();
        data.extend_from_slice(&(body.len() as u32).to_be_bytes());
        data.extend_from_slice(body);
        data
    }

    /// A `Code` attribute with a line number table, and a local variable table if `locals` is
    /// not empty. Locals are `(start_pc, length, name, descriptor, index)`.
    pub(crate) fn code(
        &mut self,
        code: &[u8],
        lines: &[(u16, u16)],
        locals: &[(u16, u16, &str, &str, u16)],
    ) -> EncodedAttribute {
        let mut nested = Vec::new();

        let mut body = (lines.len() as u16).to_be_bytes().to_vec();
        for (start_pc, line) in lines {
            body.extend_from_slice(&start_pc.to_be_bytes());
            body.extend_from_slice(&line.to_be_bytes());
        }
        nested.push(self.attribute("LineNumberTable", &body));

        if !locals.is_empty() {
            let mut body = (locals.len() as u16).to_be_bytes().to_vec();
            for (start_pc, length, name, desc, index) in locals {
                let name = self.utf8(name);
                let desc = self.utf8(desc);
                for v in [*start_pc, *length, name, desc, *index] {
                    body.extend_from_slice(&v.to_be_bytes());
                }
            }
            nested.push(self.attribute("LocalVariableTable", &body));
        }

        let mut body = Vec::new();
        body.extend_from_slice(&4u16.to_be_bytes());
        body.extend_from_slice(&4u16.to_be_bytes());
        body.extend_from_slice(&(code.len() as u32).to_be_bytes());
        body.extend_from_slice(code);
        // No exception handlers
        body.extend_from_slice(&0u16.to_be_bytes());
        body.extend_from_slice(&(nested.len() as u16).to_be_bytes());
        for attr in nested {
            body.extend_from_slice(&attr);
        }
        self.attribute("Code", &body)
    }

    fn member(
        &mut self,
        flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[EncodedAttribute],
    ) -> Vec<u8> {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let mut data = Vec::new();
        data.extend_from_slice(&flags.to_be_bytes());
        data.extend_from_slice(&name.to_be_bytes());
        data.extend_from_slice(&descriptor.to_be_bytes());
        data.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attr in attributes {
            data.extend_from_slice(attr);
        }
        data
    }

    pub(crate) fn field(
        &mut self,
        flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[EncodedAttribute],
    ) -> &mut Self {
        let data = self.member(flags, name, descriptor, attributes);
        self.fields.extend_from_slice(&data);
        self.field_count += 1;
        self
    }

    pub(crate) fn method(
        &mut self,
        flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[EncodedAttribute],
    ) -> &mut Self {
        let data = self.member(flags, name, descriptor, attributes);
        self.methods.extend_from_slice(&data);
        self.method_count += 1;
        self
    }

    pub(crate) fn class_attribute(&mut self, attribute: EncodedAttribute) -> &mut Self {
        self.attributes.extend_from_slice(&attribute);
        self.attribute_count += 1;
        self
    }

    pub(crate) fn source_file(&mut self, file: &str) -> &mut Self {
        let file = self.utf8(file);
        let attr = self.attribute("SourceFile", &file.to_be_bytes());
        self.class_attribute(attr)
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&CLASS_FILE_MAGIC.to_be_bytes());
        // minor, major
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&52u16.to_be_bytes());
        data.extend_from_slice(&self.pool_count.to_be_bytes());
        data.extend_from_slice(&self.pool);
        data.extend_from_slice(&self.access_flags.to_be_bytes());
        data.extend_from_slice(&self.this_class.to_be_bytes());
        data.extend_from_slice(&self.super_class.to_be_bytes());
        data.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            data.extend_from_slice(&interface.to_be_bytes());
        }
        data.extend_from_slice(&self.field_count.to_be_bytes());
        data.extend_from_slice(&self.fields);
        data.extend_from_slice(&self.method_count.to_be_bytes());
        data.extend_from_slice(&self.methods);
        data.extend_from_slice(&self.attribute_count.to_be_bytes());
        data.extend_from_slice(&self.attributes);
        data
    }
}
