//! ROSE component codec: invoke / result / error / reject, BER-encoded
//! inside a facility IE (spec §4.3).

use pri_core::{CodecError, OctetReader, OctetWriter};

use crate::ber::{self, Class, TagHeader};

/// ROSE component tags (context-specific, constructed) per X.219/X.229.
mod component_tag {
    pub const INVOKE: u32 = 1;
    pub const RETURN_RESULT: u32 = 2;
    pub const RETURN_ERROR: u32 = 3;
    pub const REJECT: u32 = 4;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationCode {
    Local(i64),
    Global(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoke {
    pub invoke_id: i64,
    pub operation: OperationCode,
    /// Raw BER-encoded argument, interpreted by `crate::ops`.
    pub argument: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnResult {
    pub invoke_id: i64,
    pub operation: Option<OperationCode>,
    pub result: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnError {
    pub invoke_id: i64,
    pub error_code: OperationCode,
    pub parameter: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectProblem {
    General(i64),
    Invoke(i64),
    ReturnResult(i64),
    ReturnError(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reject {
    /// `None` if the invoke id itself could not be parsed.
    pub invoke_id: Option<i64>,
    pub problem: RejectProblem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Invoke(Invoke),
    ReturnResult(ReturnResult),
    ReturnError(ReturnError),
    Reject(Reject),
}

fn decode_invoke_id(r: &mut OctetReader) -> Result<i64, CodecError> {
    let tlv = ber::decode_tlv(r)?;
    ber::decode_integer(tlv.value)
}

fn decode_operation_code(r: &mut OctetReader) -> Result<OperationCode, CodecError> {
    let tlv = ber::decode_tlv(r)?;
    match tlv.header.tag_number {
        2 => Ok(OperationCode::Local(ber::decode_integer(tlv.value)?)),
        6 => Ok(OperationCode::Global(tlv.value.to_vec())),
        other => Err(CodecError::InvalidTag(other as u8)),
    }
}

/// Decodes one top-level ROSE component (the facility IE's payload may
/// carry several in sequence; the caller loops).
pub fn decode(r: &mut OctetReader) -> Result<Component, CodecError> {
    let tag = TagHeader::decode(r)?;
    let len = ber::decode_length(r)?;
    let body = r.read_bytes(len, "rose.component.body")?;
    let mut br = OctetReader::new(body);

    match tag.tag_number {
        component_tag::INVOKE => {
            let invoke_id = decode_invoke_id(&mut br)?;
            let operation = decode_operation_code(&mut br)?;
            let argument = br.rest().to_vec();
            Ok(Component::Invoke(Invoke { invoke_id, operation, argument }))
        }
        component_tag::RETURN_RESULT => {
            let invoke_id = decode_invoke_id(&mut br)?;
            if br.is_empty() {
                return Ok(Component::ReturnResult(ReturnResult { invoke_id, operation: None, result: Vec::new() }));
            }
            // Result sequence: SEQUENCE { operationCode, result } — constructed, context 0x30-ish.
            let seq = ber::decode_tlv(&mut br)?;
            let mut sr = OctetReader::new(seq.value);
            let operation = decode_operation_code(&mut sr)?;
            let result = sr.rest().to_vec();
            Ok(Component::ReturnResult(ReturnResult { invoke_id, operation: Some(operation), result }))
        }
        component_tag::RETURN_ERROR => {
            let invoke_id = decode_invoke_id(&mut br)?;
            let error_code = decode_operation_code(&mut br)?;
            let parameter = br.rest().to_vec();
            Ok(Component::ReturnError(ReturnError { invoke_id, error_code, parameter }))
        }
        component_tag::REJECT => {
            let first = ber::decode_tlv(&mut br)?;
            let invoke_id = if first.header.tag_number == 0 {
                None
            } else {
                Some(ber::decode_integer(first.value)?)
            };
            let problem_tlv = ber::decode_tlv(&mut br)?;
            let problem_value = ber::decode_integer(problem_tlv.value)?;
            let problem = match problem_tlv.header.tag_number {
                0 => RejectProblem::General(problem_value),
                1 => RejectProblem::Invoke(problem_value),
                2 => RejectProblem::ReturnResult(problem_value),
                _ => RejectProblem::ReturnError(problem_value),
            };
            Ok(Component::Reject(Reject { invoke_id, problem }))
        }
        other => Err(CodecError::InvalidTag(other as u8)),
    }
}

pub fn encode(component: &Component, w: &mut OctetWriter) {
    let mut body = OctetWriter::new();
    let tag_number = match component {
        Component::Invoke(invoke) => {
            encode_integer_tlv(invoke.invoke_id, 2, &mut body);
            encode_operation_code(&invoke.operation, &mut body);
            body.push_bytes(&invoke.argument);
            component_tag::INVOKE
        }
        Component::ReturnResult(result) => {
            encode_integer_tlv(result.invoke_id, 2, &mut body);
            if let Some(op) = &result.operation {
                let mut seq = OctetWriter::new();
                encode_operation_code(op, &mut seq);
                seq.push_bytes(&result.result);
                ber::encode_tlv(
                    TagHeader { class: Class::Universal, constructed: true, tag_number: 0x10 },
                    seq.as_slice(),
                    &mut body,
                );
            }
            component_tag::RETURN_RESULT
        }
        Component::ReturnError(err) => {
            encode_integer_tlv(err.invoke_id, 2, &mut body);
            encode_operation_code(&err.error_code, &mut body);
            body.push_bytes(&err.parameter);
            component_tag::RETURN_ERROR
        }
        Component::Reject(reject) => {
            match reject.invoke_id {
                Some(id) => encode_integer_tlv(id, 2, &mut body),
                None => ber::encode_tlv(
                    TagHeader { class: Class::Universal, constructed: false, tag_number: 5 },
                    &[],
                    &mut body,
                ),
            }
            let (problem_tag, value) = match reject.problem {
                RejectProblem::General(v) => (0u32, v),
                RejectProblem::Invoke(v) => (1, v),
                RejectProblem::ReturnResult(v) => (2, v),
                RejectProblem::ReturnError(v) => (3, v),
            };
            let mut int_bytes = OctetWriter::new();
            ber::encode_integer(value, &mut int_bytes);
            ber::encode_tlv(
                TagHeader { class: Class::ContextSpecific, constructed: false, tag_number: problem_tag },
                int_bytes.as_slice(),
                &mut body,
            );
            component_tag::REJECT
        }
    };
    ber::encode_tlv(
        TagHeader { class: Class::ContextSpecific, constructed: true, tag_number },
        body.as_slice(),
        w,
    );
}

fn encode_integer_tlv(value: i64, tag_number: u32, w: &mut OctetWriter) {
    let mut int_bytes = OctetWriter::new();
    ber::encode_integer(value, &mut int_bytes);
    ber::encode_tlv(TagHeader { class: Class::Universal, constructed: false, tag_number }, int_bytes.as_slice(), w);
}

fn encode_operation_code(op: &OperationCode, w: &mut OctetWriter) {
    match op {
        OperationCode::Local(v) => encode_integer_tlv(*v, 2, w),
        OperationCode::Global(bytes) => {
            ber::encode_tlv(TagHeader { class: Class::Universal, constructed: false, tag_number: 6 }, bytes, w)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_round_trips() {
        let invoke = Invoke { invoke_id: 1, operation: OperationCode::Local(7), argument: vec![0x02, 0x01, 0x05] };
        let component = Component::Invoke(invoke.clone());
        let mut w = OctetWriter::new();
        encode(&component, &mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        assert_eq!(decode(&mut r).unwrap(), Component::Invoke(invoke));
    }

    #[test]
    fn reject_without_invoke_id_round_trips() {
        let reject = Reject { invoke_id: None, problem: RejectProblem::General(0) };
        let component = Component::Reject(reject);
        let mut w = OctetWriter::new();
        encode(&component, &mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        assert_eq!(decode(&mut r).unwrap(), component);
    }

    #[test]
    fn return_result_with_no_data_round_trips() {
        let result = ReturnResult { invoke_id: 3, operation: None, result: Vec::new() };
        let component = Component::ReturnResult(result);
        let mut w = OctetWriter::new();
        encode(&component, &mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        assert_eq!(decode(&mut r).unwrap(), component);
    }
}
