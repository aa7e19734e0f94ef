mod test_hot_water_scenarios;
