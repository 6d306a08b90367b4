//! DTO 与领域模型互转。

use api_contract::{
    CreateTemplateParameterDto, CreateTemplateRequest, DamDto, InstrumentTemplateDto,
    InstrumentTypeDto, ReadingEntryDto,
};
use dam_normalize::parse_decimal;
use domain::{
    Dam, InstrumentParameter, InstrumentTemplate, InstrumentType, NewInstrumentTemplate,
    ParameterId, PendingReading,
};

/// 新建模板时计量单位固定为该 id。
pub const DEFAULT_MEASUREMENT_UNIT: u32 = 2;

pub fn dam_from_dto(dto: DamDto) -> Dam {
    Dam {
        domain_id: dto.domain_id,
        name: dto.name,
        company_name: dto.company_name.filter(|name| !name.is_empty()),
    }
}

pub fn instrument_type_from_dto(dto: InstrumentTypeDto) -> InstrumentType {
    InstrumentType {
        domain_id: dto.domain_id,
        name: dto.name,
        measurement_units: dto
            .measurement_units
            .into_iter()
            .map(|unit| unit.measurement_unit.name)
            .filter(|name| !name.is_empty())
            .collect(),
    }
}

pub fn template_from_dto(dto: InstrumentTemplateDto) -> InstrumentTemplate {
    InstrumentTemplate {
        id: dto.domain_id,
        custom_name: dto.custom_name,
        instrument_type: instrument_type_from_dto(dto.instrument_type),
        parameters: dto
            .client_instrument_template_parameter
            .into_iter()
            .map(|param| InstrumentParameter {
                id: ParameterId::new(param.domain_id),
                name: param.parameter_name,
                attention_value: param.attention_value,
                alert_value: param.alert_value,
            })
            .collect(),
    }
}

pub fn reading_to_dto(reading: &PendingReading) -> ReadingEntryDto {
    ReadingEntryDto {
        instrument_template_id: reading.instrument_template_id.clone(),
        instrument_type_id: reading.instrument_type_id.clone(),
        instrument_type_name: reading.instrument_type_name.clone(),
        custom_name: reading.custom_name.clone(),
        values: reading.values.clone(),
        notes: reading.notes.clone(),
        date: reading.date.clone(),
    }
}

/// 阈值文本允许逗号；无法解析时以 null 发送。
pub fn create_template_request(template: &NewInstrumentTemplate) -> CreateTemplateRequest {
    CreateTemplateRequest {
        instrument_type_domain_id: template.instrument_type_id.clone(),
        custom_name: template.custom_name.clone(),
        client_instrument_template_parameter: template
            .parameters
            .iter()
            .map(|param| CreateTemplateParameterDto {
                measurement_unit: DEFAULT_MEASUREMENT_UNIT,
                alert_value: parse_decimal(&param.alert_value),
                attention_value: parse_decimal(&param.attention_value),
                parameter_name: param.name.clone(),
            })
            .collect(),
    }
}
