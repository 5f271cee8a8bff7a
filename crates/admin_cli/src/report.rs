//! Plain text rendering of a statistics report.

use std::fmt::Write;

use engine::{Measure, StatisticsReport};

fn mileage(value: f64, record_count: usize) -> String {
    if record_count == 0 {
        Measure::NoData.to_string()
    } else {
        format!("{value:.1}")
    }
}

pub fn render(report: &StatisticsReport) -> String {
    let mut out = String::new();
    let fleet = &report.fleet;

    let _ = writeln!(out, "Refuels:                 {}", fleet.record_count);
    let _ = writeln!(out, "Total liters:            {}", fleet.total_liters);
    let _ = writeln!(out, "Total spent:             {}", fleet.total_spent);
    let _ = writeln!(out, "Average price per liter: {}", fleet.average_price_per_liter);

    if !fleet.has_data {
        let _ = writeln!(out, "\nNo refuels logged yet.");
        return out;
    }

    for line in &report.cars {
        let summary = &line.summary;
        let _ = writeln!(out, "\n{}", line.name);
        let _ = writeln!(out, "  refuels:             {}", summary.record_count);
        let _ = writeln!(out, "  liters:              {}", summary.liters);
        let _ = writeln!(out, "  spent:               {}", summary.total_spent);
        let _ = writeln!(out, "  price per liter:     {}", summary.average_price_per_liter);
        let _ = writeln!(
            out,
            "  mileage:             {} - {}",
            mileage(summary.min_mileage, summary.record_count),
            mileage(summary.max_mileage, summary.record_count)
        );
        let _ = writeln!(
            out,
            "  consumption l/100:   {}",
            summary.average_consumption_per_100
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::{Car, FuelRecord, MoneyCents, Volume};
    use uuid::Uuid;

    use super::*;

    fn record(car: &Car, mileage: f64, liters: i64, total: i64) -> FuelRecord {
        FuelRecord {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            car_id: Some(car.id),
            car: Some(car.name.clone()),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            mileage,
            liters: Volume::new(liters),
            price_per_liter: MoneyCents::new(100_00),
            total_price: MoneyCents::new(total),
        }
    }

    #[test]
    fn empty_report() {
        let report = StatisticsReport::build(&[], &[]);
        let text = render(&report);
        assert!(text.contains("Refuels:                 0"));
        assert!(text.contains("Average price per liter: —"));
        assert!(text.contains("No refuels logged yet."));
    }

    #[test]
    fn car_lines() {
        let car = Car::new("Car1".to_string(), "alice");
        let records = vec![
            record(&car, 10_000.0, 40_00, 4000_00),
            record(&car, 10_500.0, 38_00, 3800_00),
        ];
        let report = StatisticsReport::build(&records, std::slice::from_ref(&car));
        let text = render(&report);

        assert!(text.contains("Total liters:            78.00"));
        assert!(text.contains("Total spent:             7800.00"));
        assert!(text.contains("\nCar1\n"));
        assert!(text.contains("mileage:             10000.0 - 10500.0"));
        assert!(text.contains("consumption l/100:   15.60"));
    }

    #[test]
    fn single_refuel_has_no_consumption() {
        let car = Car::new("Car1".to_string(), "alice");
        let report = StatisticsReport::build(&[record(&car, 500.0, 10_00, 10_00)], &[]);
        assert!(render(&report).contains("consumption l/100:   —"));
    }
}
